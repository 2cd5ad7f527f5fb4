use plumelet_models::{
    db_conn::DbConn,
    follows::{Follow, NewFollow},
    posts::Post,
    users::User,
};
use rocket::{
    request::FlashMessage,
    response::{Flash, Redirect},
};

use crate::routes::{errors::ErrorPage, flash_msg, Page};
use crate::template_utils::Ructe;
use crate::utils;

#[get("/profile/<username>?<page>")]
pub fn details(
    username: String,
    page: Option<Page>,
    conn: DbConn,
    account: Option<User>,
    flash: Option<FlashMessage<'_, '_>>,
) -> Result<Ructe, ErrorPage> {
    let profile = User::find_by_name(&conn, &username)?;
    let n_posts = Post::count_for_author(&conn, &profile)? as i32;
    let page = page.unwrap_or_default().clamped(n_posts);
    let posts = Post::page_for_author(&conn, &profile, page.limits())?;
    let is_following = account
        .as_ref()
        .map(|u| u.is_following(&conn, profile.id))
        .transpose()?
        .unwrap_or(false);
    let n_followers = Follow::count_followers(&conn, profile.id)?;
    Ok(render!(users::details(
        &(&*conn, account, flash_msg(flash)),
        profile,
        is_following,
        n_followers,
        posts,
        page,
        n_posts
    )))
}

/// Subscribes the logged-in user to an author. Asking to follow yourself,
/// or someone you already follow, silently redirects back: the storage
/// layer's unique constraint is the authority against duplicate edges, and
/// this handler keeps the route idempotent on top of it.
#[get("/profile/<username>/follow")]
pub fn follow(username: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    let target = User::find_by_name(&conn, &username)?;
    if target.id != user.id && Follow::find(&conn, user.id, target.id).is_err() {
        Follow::insert(
            &conn,
            NewFollow {
                follower_id: user.id,
                following_id: target.id,
            },
        )?;
    }
    Ok(Redirect::to(format!("/profile/{}", target.username)))
}

#[get("/profile/<username>/follow", rank = 2)]
pub fn follow_auth(username: String) -> Flash<Redirect> {
    utils::requires_login(
        "You need to be logged in to subscribe to someone",
        &format!("/profile/{}/follow", username),
    )
}

/// Removes the follow edge if it exists. Unfollowing someone you don't
/// follow is not an error.
#[get("/profile/<username>/unfollow")]
pub fn unfollow(username: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    let target = User::find_by_name(&conn, &username)?;
    if let Ok(follow) = Follow::find(&conn, user.id, target.id) {
        follow.delete(&conn)?;
    }
    Ok(Redirect::to(format!("/profile/{}", target.username)))
}

#[get("/profile/<username>/unfollow", rank = 2)]
pub fn unfollow_auth(username: String) -> Flash<Redirect> {
    utils::requires_login(
        "You need to be logged in to unsubscribe from someone",
        &format!("/profile/{}/unfollow", username),
    )
}
