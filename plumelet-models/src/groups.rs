use crate::{schema::groups, Connection, Error, Result};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

/// A topical container for posts. Groups are reference data: they are
/// created from the CLI and never mutated through the web interface.
#[derive(Queryable, Identifiable, Clone, Debug)]
pub struct Group {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Insertable)]
#[table_name = "groups"]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl NewGroup {
    pub fn new(title: &str, slug: &str, description: &str) -> Result<NewGroup> {
        if slug.trim().is_empty() || title.trim().is_empty() {
            return Err(Error::InvalidValue);
        }
        Ok(NewGroup {
            title: title.to_owned(),
            slug: slug.to_owned(),
            description: description.to_owned(),
        })
    }
}

impl Group {
    get!(groups);
    insert!(groups, NewGroup);
    find_by!(groups, find_by_slug, slug as &str);

    pub fn list(conn: &Connection) -> Result<Vec<Group>> {
        groups::table
            .order(groups::title.asc())
            .load(conn)
            .map_err(Error::from)
    }

    pub fn url(&self) -> String {
        format!("/group/{}", self.slug)
    }
}
