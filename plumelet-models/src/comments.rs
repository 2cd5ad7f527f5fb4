use crate::{posts::Post, schema::comments, users::User, Connection, Error, Result};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(Queryable, Identifiable, Clone, Debug)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub creation_date: NaiveDateTime,
    pub author_id: i32,
    pub post_id: i32,
}

#[derive(Insertable)]
#[table_name = "comments"]
pub struct NewComment {
    pub text: String,
    pub author_id: i32,
    pub post_id: i32,
}

impl Comment {
    get!(comments);
    insert!(comments, NewComment);

    /// Comments under a post, oldest first.
    pub fn list_for_post(conn: &Connection, post_id: i32) -> Result<Vec<Comment>> {
        comments::table
            .filter(comments::post_id.eq(post_id))
            .order((comments::creation_date.asc(), comments::id.asc()))
            .load::<Comment>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_post(conn: &Connection, post_id: i32) -> Result<i64> {
        comments::table
            .filter(comments::post_id.eq(post_id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn get_author(&self, conn: &Connection) -> Result<User> {
        User::get(conn, self.author_id)
    }

    pub fn get_post(&self, conn: &Connection) -> Result<Post> {
        Post::get(conn, self.post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        posts::NewPost,
        tests::{db, fill_database},
    };
    use diesel::Connection;

    #[test]
    fn listed_in_chronological_order() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let (users, _) = fill_database(&conn);
            let post = Post::insert(
                &conn,
                NewPost {
                    text: "A post".to_owned(),
                    creation_date: None,
                    author_id: users[0].id,
                    group_id: None,
                    image_id: None,
                },
            )
            .unwrap();

            for (author, text) in &[(1, "first!"), (2, "second"), (1, "third")] {
                Comment::insert(
                    &conn,
                    NewComment {
                        text: (*text).to_owned(),
                        author_id: users[*author].id,
                        post_id: post.id,
                    },
                )
                .unwrap();
            }

            let listed = Comment::list_for_post(&conn, post.id).unwrap();
            let texts = listed.iter().map(|c| c.text.as_str()).collect::<Vec<_>>();
            assert_eq!(vec!["first!", "second", "third"], texts);
            assert_eq!(3, Comment::count_for_post(&conn, post.id).unwrap());

            assert_eq!(users[1].id, listed[0].get_author(&conn).unwrap().id);
            assert_eq!(post.id, listed[0].get_post(&conn).unwrap().id);
            Ok(())
        });
    }
}
