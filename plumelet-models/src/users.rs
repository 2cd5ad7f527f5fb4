use crate::{db_conn::DbConn, schema::users, Connection, Error, Result};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};
use rocket::{
    outcome::IntoOutcome,
    request::{self, FromRequest, Request},
};

pub const AUTH_COOKIE: &str = "user_id";

const BCRYPT_COST: u32 = 10;

#[derive(Queryable, Identifiable, Clone, Debug)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub hashed_password: Option<String>,
    pub creation_date: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub hashed_password: Option<String>,
}

impl NewUser {
    pub fn new_local(username: &str, display_name: &str, password: &str) -> Result<NewUser> {
        if username.trim().is_empty() {
            return Err(Error::InvalidValue);
        }
        Ok(NewUser {
            username: username.to_owned(),
            display_name: display_name.to_owned(),
            hashed_password: Some(User::hash_pass(password)?),
        })
    }
}

impl User {
    get!(users);
    insert!(users, NewUser);
    find_by!(users, find_by_name, username as &str);

    pub fn hash_pass(pass: &str) -> Result<String> {
        bcrypt::hash(pass, BCRYPT_COST).map_err(|_| Error::InvalidValue)
    }

    pub fn auth(&self, pass: &str) -> bool {
        self.hashed_password
            .as_ref()
            .map(|hash| bcrypt::verify(pass, hash).unwrap_or(false))
            .unwrap_or(false)
    }

    /// The name shown next to this user's posts and comments.
    pub fn name(&self) -> String {
        if self.display_name.trim().is_empty() {
            self.username.clone()
        } else {
            self.display_name.clone()
        }
    }

    pub fn is_following(&self, conn: &Connection, other_id: i32) -> Result<bool> {
        use crate::schema::follows;
        Ok(follows::table
            .filter(follows::follower_id.eq(self.id))
            .filter(follows::following_id.eq(other_id))
            .count()
            .get_result::<i64>(conn)?
            > 0)
    }
}

impl<'a, 'r> FromRequest<'a, 'r> for User {
    type Error = ();

    fn from_request(request: &'a Request<'r>) -> request::Outcome<User, ()> {
        let conn = request.guard::<DbConn>()?;
        request
            .cookies()
            .get_private(AUTH_COOKIE)
            .and_then(|cookie| cookie.value().parse().ok())
            .and_then(|id| User::get(&*conn, id).ok())
            .or_forward(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tests::{db, fill_database};
    use diesel::Connection;

    #[test]
    fn find_by() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let (users, _) = fill_database(&conn);
            let found = User::find_by_name(&conn, "user").unwrap();
            assert_eq!(users[1].id, found.id);
            assert!(matches!(
                User::find_by_name(&conn, "missing"),
                Err(Error::NotFound)
            ));
            Ok(())
        });
    }

    #[test]
    fn auth() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let user = User::insert(
                &conn,
                NewUser::new_local("zina", "Zina", "correct horse").unwrap(),
            )
            .unwrap();
            assert!(user.auth("correct horse"));
            assert!(!user.auth("wrong pony"));
            Ok(())
        });
    }

    #[test]
    fn blank_username_rejected() {
        assert!(matches!(
            NewUser::new_local("  ", "Nameless", "hunter2"),
            Err(Error::InvalidValue)
        ));
    }

    #[test]
    fn name_falls_back_to_username() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let user =
                User::insert(&conn, NewUser::new_local("terse", "", "hunter2").unwrap()).unwrap();
            assert_eq!("terse", user.name());
            Ok(())
        });
    }
}
