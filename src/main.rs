#![feature(proc_macro_hygiene, decl_macro)]

#[macro_use]
extern crate rocket;

use diesel::r2d2::ConnectionManager;
use plumelet_models::{db_conn::DbPool, page_cache::PageCache, Connection, CONFIG};
use rocket::Config;
use tracing::info;

include!(concat!(env!("OUT_DIR"), "/templates.rs"));

#[macro_use]
mod template_utils;
mod routes;
#[cfg(test)]
mod tests;
mod utils;

/// Initializes a database pool.
fn init_pool() -> DbPool {
    let manager = ConnectionManager::<Connection>::new(CONFIG.database_url.as_str());
    let mut builder = DbPool::builder();
    if let Some(max_size) = CONFIG.db_max_size {
        builder = builder.max_size(max_size);
    }
    if CONFIG.db_min_idle.is_some() {
        builder = builder.min_idle(CONFIG.db_min_idle);
    }
    builder
        .build(manager)
        .expect("main: database pool initialization error")
}

pub fn rocket(config: Config, pool: DbPool, cache: PageCache) -> rocket::Rocket {
    rocket::custom(config)
        .mount(
            "/",
            routes![
                routes::comments::create,
                routes::comments::create_auth,
                routes::groups::details,
                routes::posts::create,
                routes::posts::create_auth,
                routes::posts::details,
                routes::posts::edit,
                routes::posts::edit_auth,
                routes::posts::new,
                routes::posts::new_auth,
                routes::posts::update,
                routes::posts::update_auth,
                routes::session::create,
                routes::session::delete,
                routes::session::new,
                routes::static_files,
                routes::timelines::feed,
                routes::timelines::feed_auth,
                routes::timelines::index,
                routes::user::details,
                routes::user::follow,
                routes::user::follow_auth,
                routes::user::unfollow,
                routes::user::unfollow_auth,
            ],
        )
        .register(catchers![
            routes::errors::forbidden,
            routes::errors::not_found,
            routes::errors::server_error,
        ])
        .manage(pool)
        .manage(cache)
}

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = CONFIG
        .rocket
        .clone()
        .expect("Error with Rocket config: have you set ROCKET_SECRET_KEY?");
    info!("Starting Plumelet on {}", CONFIG.base_url.as_str());
    rocket(config, init_pool(), PageCache::from_config()).launch();
}
