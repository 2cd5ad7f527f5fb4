#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;
#[macro_use]
extern crate lazy_static;

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
pub type Connection = diesel::SqliteConnection;

#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub type Connection = diesel::PgConnection;

/// All the possible errors that can be encountered in this crate.
#[derive(Debug)]
pub enum Error {
    Db(diesel::result::Error),
    Io(std::io::Error),
    Migration(diesel_migrations::RunMigrationsError),
    InvalidValue,
    NotFound,
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Error::NotFound,
            _ => Error::Db(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<diesel_migrations::RunMigrationsError> for Error {
    fn from(err: diesel_migrations::RunMigrationsError) -> Self {
        Error::Migration(err)
    }
}

macro_rules! find_by {
    ($table:ident, $fn:ident, $($col:ident as $type:ty),+) => {
        /// Try to find a $table with a given $col
        pub fn $fn(conn: &crate::Connection, $($col: $type),+) -> Result<Self> {
            $table::table
                $(.filter($table::$col.eq($col)))+
                .first(conn)
                .map_err(Error::from)
        }
    };
}

macro_rules! get {
    ($table:ident) => {
        pub fn get(conn: &crate::Connection, id: i32) -> Result<Self> {
            $table::table
                .filter($table::id.eq(id))
                .first(conn)
                .map_err(Error::from)
        }
    };
}

macro_rules! last {
    ($table:ident) => {
        pub fn last(conn: &crate::Connection) -> Result<Self> {
            $table::table
                .order_by($table::id.desc())
                .first(conn)
                .map_err(Error::from)
        }
    };
}

macro_rules! insert {
    ($table:ident, $from:ty) => {
        last!($table);

        pub fn insert(conn: &crate::Connection, new: $from) -> Result<Self> {
            diesel::insert_into($table::table).values(new).execute(conn)?;
            Self::last(conn)
        }
    };
}

pub mod comments;
mod config;
pub mod db_conn;
pub mod follows;
pub mod groups;
pub mod medias;
pub mod migrations;
pub mod page_cache;
pub mod posts;
pub mod schema;
pub mod users;

pub use config::{Config, HomeCacheConfig, InvalidRocketConfig, CONFIG};

#[cfg(test)]
pub(crate) mod tests {
    use crate::{
        db_conn::DbConn,
        groups::{Group, NewGroup},
        users::{NewUser, User},
        Connection as Conn,
    };
    use diesel::r2d2::{ConnectionManager, Pool};

    pub(crate) fn db() -> DbConn {
        let manager = ConnectionManager::<Conn>::new(":memory:");
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("tests::db: pool error");
        let conn = DbConn(pool.get().expect("tests::db: connection error"));
        crate::migrations::run(&*conn).expect("tests::db: migration error");
        conn
    }

    pub(crate) fn fill_database(conn: &Conn) -> (Vec<User>, Vec<Group>) {
        let admin = User::insert(
            conn,
            NewUser::new_local("admin", "The admin", "my_password").unwrap(),
        )
        .unwrap();
        let user = User::insert(
            conn,
            NewUser::new_local("user", "Some user", "password").unwrap(),
        )
        .unwrap();
        let other = User::insert(
            conn,
            NewUser::new_local("other", "Another user", "123456").unwrap(),
        )
        .unwrap();
        let chatter = Group::insert(
            conn,
            NewGroup::new("Chatter", "chatter", "Everyday conversations").unwrap(),
        )
        .unwrap();
        let poetry = Group::insert(
            conn,
            NewGroup::new("Poetry", "poetry", "Verse of all kinds").unwrap(),
        )
        .unwrap();
        (vec![admin, user, other], vec![chatter, poetry])
    }
}
