use plumelet_models::{
    db_conn::DbConn, page_cache::PageCache, posts::Post, users::User, Connection,
};
use rocket::{
    request::FlashMessage,
    response::{Flash, Redirect},
    State,
};

use crate::routes::{errors::ErrorPage, flash_msg, Page};
use crate::template_utils::Ructe;
use crate::templates::Html;
use crate::utils;

/// The global feed.
///
/// The rendered post list of the default page lives in the single-slot
/// page cache for a short while, so burst traffic does not recompute it on
/// every request. Within that window the feed content is allowed to be
/// stale; requests that ask for an explicit page bypass the slot.
#[get("/?<page>")]
pub fn index(
    conn: DbConn,
    user: Option<User>,
    page: Option<Page>,
    flash: Option<FlashMessage<'_, '_>>,
    cache: State<'_, PageCache>,
) -> Result<Ructe, ErrorPage> {
    let feed = match page {
        Some(page) => home_feed(&conn, page)?,
        None => match cache.get() {
            Some(cached) => cached,
            None => {
                let fresh = home_feed(&conn, Page::first())?;
                cache.insert(fresh.clone());
                fresh
            }
        },
    };
    Ok(render!(timelines::index(
        &(&*conn, user, flash_msg(flash)),
        Html(feed)
    )))
}

fn home_feed(conn: &Connection, page: Page) -> Result<String, plumelet_models::Error> {
    let n_posts = Post::count(conn)? as i32;
    let page = page.clamped(n_posts);
    let posts = Post::page(conn, page.limits())?;
    Ok(render_html!(timelines::post_list(
        conn, posts, page, n_posts
    )))
}

/// Posts from the authors the logged-in user follows.
#[get("/feed?<page>")]
pub fn feed(
    user: User,
    conn: DbConn,
    page: Option<Page>,
    flash: Option<FlashMessage<'_, '_>>,
) -> Result<Ructe, ErrorPage> {
    let n_posts = Post::count_followed(&conn, &user)? as i32;
    let page = page.unwrap_or_default().clamped(n_posts);
    let posts = Post::followed_page(&conn, &user, page.limits())?;
    Ok(render!(timelines::feed(
        &(&*conn, Some(user), flash_msg(flash)),
        posts,
        page,
        n_posts
    )))
}

#[get("/feed", rank = 2)]
pub fn feed_auth() -> Flash<Redirect> {
    utils::requires_login("You need to be logged in to see your feed", "/feed")
}
