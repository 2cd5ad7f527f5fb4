use crate::templates::Html;
use chrono::NaiveDateTime;
use plumelet_models::{groups::Group, posts::Post, users::User, Connection};
use rocket::http::{Method, Status};
use rocket::request::Request;
use rocket::response::{self, content::Html as HtmlCt, Responder, Response};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use validator::ValidationErrors;

pub use askama_escape::escape;

/// What every template gets: a database connection, the logged-in user if
/// any, and the flash message to display, if any.
pub type BaseContext<'a> = &'a (&'a Connection, Option<User>, Option<(String, String)>);

#[derive(Debug)]
pub struct Ructe(pub Vec<u8>);

impl<'r> Responder<'r> for Ructe {
    fn respond_to(self, r: &Request<'_>) -> response::Result<'r> {
        //if method is not Get or page contain a form, no caching
        if r.method() != Method::Get || self.0.windows(6).any(|w| w == b"<form ") {
            return HtmlCt(self.0).respond_to(r);
        }
        let mut hasher = DefaultHasher::new();
        hasher.write(&self.0);
        let etag = format!("{:x}", hasher.finish());
        if r.headers()
            .get("If-None-Match")
            .any(|s| s[1..s.len() - 1] == etag)
        {
            Response::build()
                .status(Status::NotModified)
                .header("ETag", etag)
                .ok()
        } else {
            Response::build()
                .merge(HtmlCt(self.0).respond_to(r)?)
                .header("ETag", etag)
                .ok()
        }
    }
}

/// Renders a template into a [`Ructe`] response.
#[macro_export]
macro_rules! render {
    ($group:tt :: $page:tt ( $( $param:expr ),* ) ) => {
        {
            use crate::templates;

            let mut res = vec![];
            templates::$group::$page(
                &mut res,
                $(
                    $param
                ),*
            ).unwrap();
            crate::template_utils::Ructe(res)
        }
    }
}

/// Renders a template fragment into an owned `String`, for embedding in
/// another page or storing in the page cache.
#[macro_export]
macro_rules! render_html {
    ($group:tt :: $page:tt ( $( $param:expr ),* ) ) => {
        {
            use crate::templates;

            let mut res = vec![];
            templates::$group::$page(
                &mut res,
                $(
                    $param
                ),*
            ).unwrap();
            String::from_utf8(res).unwrap()
        }
    }
}

pub fn date(dt: &NaiveDateTime) -> String {
    dt.format("%B %e, %Y").to_string()
}

pub fn date_time(dt: &NaiveDateTime) -> String {
    dt.format("%B %e, %Y at %H:%M").to_string()
}

/// The first error message recorded for a form field, or nothing.
pub fn field_error(errs: &ValidationErrors, field: &str) -> Html<String> {
    if let Some(field_errs) = errs.clone().field_errors().get(field) {
        let msg = field_errs[0].message.clone().unwrap_or_default();
        Html(format!(
            r#"<p class="error" dir="auto">{}</p>"#,
            escape(&msg)
        ))
    } else {
        Html(String::new())
    }
}

/// A `<select>` option for the post form's group picker.
pub fn group_option(group: &Group, current: Option<i32>) -> Html<String> {
    Html(format!(
        r#"<option value="{}"{}>{}</option>"#,
        group.id,
        if current == Some(group.id) {
            " selected"
        } else {
            ""
        },
        escape(&group.title)
    ))
}

/// The subscribe/unsubscribe button shown on a profile, except on your own.
pub fn follow_button(account: Option<&User>, profile: &User, is_following: bool) -> Html<String> {
    match account {
        Some(user) if user.id == profile.id => Html(String::new()),
        _ => {
            let (action, label) = if is_following {
                ("unfollow", "Unsubscribe")
            } else {
                ("follow", "Subscribe")
            };
            Html(format!(
                r#"<a class="button" href="/profile/{}/{}">{}</a>"#,
                profile.username, action, label
            ))
        }
    }
}

/// An edit link, only for the post's author.
pub fn edit_link(account: Option<&User>, post: &Post) -> Html<String> {
    match account {
        Some(user) if user.id == post.author_id => Html(format!(
            r#"<a class="button" href="{}/edit">Edit</a>"#,
            post.url()
        )),
        _ => Html(String::new()),
    }
}

/// Previous/next links for a paginated feed.
pub fn paginate(page: crate::routes::Page, n_items: i32) -> Html<String> {
    let mut res = String::new();
    res.push_str(r#"<div class="pagination" dir="auto">"#);
    if page.has_previous() {
        res.push_str(&format!(
            r#"<a href="?page={}">Previous page</a>"#,
            *page - 1
        ));
    }
    if page.has_next(n_items) {
        res.push_str(&format!(r#"<a href="?page={}">Next page</a>"#, *page + 1));
    }
    res.push_str("</div>");
    Html(res)
}
