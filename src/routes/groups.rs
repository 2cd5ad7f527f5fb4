use plumelet_models::{db_conn::DbConn, groups::Group, posts::Post, users::User};
use rocket::request::FlashMessage;

use crate::routes::{errors::ErrorPage, flash_msg, Page};
use crate::template_utils::Ructe;

#[get("/group/<slug>?<page>")]
pub fn details(
    slug: String,
    page: Option<Page>,
    conn: DbConn,
    user: Option<User>,
    flash: Option<FlashMessage<'_, '_>>,
) -> Result<Ructe, ErrorPage> {
    let group = Group::find_by_slug(&conn, &slug)?;
    let n_posts = Post::count_for_group(&conn, &group)? as i32;
    let page = page.unwrap_or_default().clamped(n_posts);
    let posts = Post::page_for_group(&conn, &group, page.limits())?;
    Ok(render!(groups::details(
        &(&*conn, user, flash_msg(flash)),
        group,
        posts,
        page,
        n_posts
    )))
}
