use crate::{
    groups::Group, medias::Media, schema::posts, users::User, Connection, Error, Result,
};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

// Every feed is ordered newest first, with descending ids as the tie-break,
// so posts sharing a timestamp tick keep a stable relative order consistent
// with the primary recency sort.

#[derive(Queryable, Identifiable, Clone, Debug)]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub creation_date: NaiveDateTime,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image_id: Option<i32>,
}

#[derive(Insertable)]
#[table_name = "posts"]
pub struct NewPost {
    pub text: String,
    pub creation_date: Option<NaiveDateTime>,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image_id: Option<i32>,
}

impl Post {
    get!(posts);
    insert!(posts, NewPost);

    /// Saves a new text, group and image for this post. The author and the
    /// creation date are never touched by updates.
    pub fn update(&self, conn: &Connection) -> Result<Self> {
        diesel::update(self)
            .set((
                posts::text.eq(&self.text),
                posts::group_id.eq(self.group_id),
                posts::image_id.eq(self.image_id),
            ))
            .execute(conn)?;
        Self::get(conn, self.id)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        posts::table.count().get_result(conn).map_err(Error::from)
    }

    pub fn page(conn: &Connection, (min, max): (i32, i32)) -> Result<Vec<Post>> {
        posts::table
            .order((posts::creation_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_group(conn: &Connection, group: &Group) -> Result<i64> {
        posts::table
            .filter(posts::group_id.eq(group.id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn page_for_group(
        conn: &Connection,
        group: &Group,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        posts::table
            .filter(posts::group_id.eq(group.id))
            .order((posts::creation_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_author(conn: &Connection, author: &User) -> Result<i64> {
        posts::table
            .filter(posts::author_id.eq(author.id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn page_for_author(
        conn: &Connection,
        author: &User,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        posts::table
            .filter(posts::author_id.eq(author.id))
            .order((posts::creation_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_followed(conn: &Connection, user: &User) -> Result<i64> {
        use crate::schema::follows;
        let followed = follows::table
            .filter(follows::follower_id.eq(user.id))
            .select(follows::following_id);
        posts::table
            .filter(posts::author_id.eq_any(followed))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    /// Posts written by any author the given user follows.
    pub fn followed_page(
        conn: &Connection,
        user: &User,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        use crate::schema::follows;
        let followed = follows::table
            .filter(follows::follower_id.eq(user.id))
            .select(follows::following_id);
        posts::table
            .filter(posts::author_id.eq_any(followed))
            .order((posts::creation_date.desc(), posts::id.desc()))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn get_author(&self, conn: &Connection) -> Result<User> {
        User::get(conn, self.author_id)
    }

    pub fn get_group(&self, conn: &Connection) -> Result<Option<Group>> {
        match self.group_id {
            Some(id) => Group::get(conn, id).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_image(&self, conn: &Connection) -> Result<Option<Media>> {
        match self.image_id {
            Some(id) => Media::get(conn, id).map(Some),
            None => Ok(None),
        }
    }

    pub fn url(&self) -> String {
        format!("/posts/{}", self.id)
    }
}
