use crate::{schema::follows, Connection, Error, Result};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

/// A directed edge meaning "follower receives the followed author's posts
/// in their personalized feed".
///
/// The storage layer is the authority for edge uniqueness: the migration
/// declares a UNIQUE (follower_id, following_id) constraint and a CHECK
/// against self-follows. Callers that want idempotent semantics should
/// look the edge up with [`Follow::find`] before inserting.
#[derive(Queryable, Identifiable, Clone, Debug)]
pub struct Follow {
    pub id: i32,
    pub follower_id: i32,
    pub following_id: i32,
}

#[derive(Insertable)]
#[table_name = "follows"]
pub struct NewFollow {
    pub follower_id: i32,
    pub following_id: i32,
}

impl Follow {
    get!(follows);
    insert!(follows, NewFollow);

    pub fn find(conn: &Connection, from: i32, to: i32) -> Result<Follow> {
        follows::table
            .filter(follows::follower_id.eq(from))
            .filter(follows::following_id.eq(to))
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self).execute(conn)?;
        Ok(())
    }

    pub fn count_followers(conn: &Connection, user_id: i32) -> Result<i64> {
        follows::table
            .filter(follows::following_id.eq(user_id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn count_following(conn: &Connection, user_id: i32) -> Result<i64> {
        follows::table
            .filter(follows::follower_id.eq(user_id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }
}
