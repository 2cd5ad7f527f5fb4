use rocket::{
    request::Form,
    response::{Flash, Redirect},
};
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::routes::errors::ErrorPage;
use crate::template_utils::Ructe;
use crate::utils;
use plumelet_models::{
    comments::{Comment, NewComment},
    db_conn::DbConn,
    posts::Post,
    users::User,
};

#[derive(Default, FromForm, Validate)]
pub struct NewCommentForm {
    #[validate(custom(
        function = "crate::routes::not_blank",
        message = "Your comment cannot be empty"
    ))]
    pub text: String,
}

#[post("/posts/<id>/comment", data = "<form>")]
pub fn create(
    id: i32,
    form: Form<NewCommentForm>,
    user: User,
    conn: DbConn,
) -> Result<Flash<Redirect>, Result<Ructe, ErrorPage>> {
    let post = Post::get(&conn, id).map_err(|e| Err(ErrorPage::from(e)))?;
    if let Err(errors) = form.validate() {
        let comments =
            Comment::list_for_post(&conn, post.id).map_err(|e| Err(ErrorPage::from(e)))?;
        return Err(Ok(render!(posts::details(
            &(&*conn, Some(user), None),
            post,
            comments,
            &*form,
            errors
        ))));
    }

    let comment = Comment::insert(
        &conn,
        NewComment {
            text: form.text.clone(),
            author_id: user.id,
            post_id: post.id,
        },
    )
    .map_err(|e| Err(ErrorPage::from(e)))?;
    info!("comment {} posted on post {}", comment.id, post.id);

    Ok(Flash::success(
        Redirect::to(format!("{}#comment-{}", post.url(), comment.id)),
        "Your comment has been posted",
    ))
}

#[post("/posts/<id>/comment", rank = 2)]
pub fn create_auth(id: i32) -> Flash<Redirect> {
    utils::requires_login(
        "You need to be logged in to comment",
        &format!("/posts/{}/comment", id),
    )
}
