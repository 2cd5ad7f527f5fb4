use crate::{schema::medias, users::User, Connection, Error, Result};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

/// An uploaded image, stored on the local filesystem under
/// `CONFIG.media_directory` and referenced by posts.
#[derive(Queryable, Identifiable, Clone, Debug)]
pub struct Media {
    pub id: i32,
    pub file_path: String,
    pub alt_text: String,
    pub owner_id: i32,
}

#[derive(Insertable)]
#[table_name = "medias"]
pub struct NewMedia {
    pub file_path: String,
    pub alt_text: String,
    pub owner_id: i32,
}

impl Media {
    get!(medias);
    insert!(medias, NewMedia);

    /// The relative URL at which this file is served.
    pub fn url(&self) -> String {
        format!("/{}", self.file_path.trim_start_matches('/'))
    }

    pub fn get_owner(&self, conn: &Connection) -> Result<User> {
        User::get(conn, self.owner_id)
    }
}
