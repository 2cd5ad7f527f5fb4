use rocket::{
    http::{Cookie, Cookies},
    request::{FlashMessage, Form},
    response::Redirect,
};
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::routes::flash_msg;
use crate::template_utils::Ructe;
use plumelet_models::{
    db_conn::DbConn,
    users::{User, AUTH_COOKIE},
};

#[derive(Default, FromForm, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please enter your username"))]
    pub username: String,
    #[validate(length(min = 1, message = "Please enter your password"))]
    pub password: String,
    pub destination: Option<String>,
}

#[get("/login?<destination>")]
pub fn new(
    user: Option<User>,
    conn: DbConn,
    destination: Option<String>,
    flash: Option<FlashMessage<'_, '_>>,
) -> Ructe {
    render!(session::login(
        &(&*conn, user, flash_msg(flash)),
        destination,
        &LoginForm::default(),
        ValidationErrors::new()
    ))
}

#[post("/login", data = "<form>")]
pub fn create(conn: DbConn, form: Form<LoginForm>, mut cookies: Cookies<'_>) -> Result<Redirect, Ructe> {
    let user = match form.validate() {
        Ok(_) => User::find_by_name(&conn, &form.username).ok(),
        Err(_) => None,
    };

    match user {
        Some(user) if user.auth(&form.password) => {
            cookies.add_private(Cookie::new(AUTH_COOKIE, user.id.to_string()));
            info!("{} logged in", user.username);
            Ok(Redirect::to(
                form.destination.clone().unwrap_or_else(|| "/".to_string()),
            ))
        }
        _ => {
            let mut err = ValidationError::new("invalid_login");
            err.message = Some("Invalid username or password".into());
            let mut errors = ValidationErrors::new();
            errors.add("password", err);
            Err(render!(session::login(
                &(&*conn, None, None),
                form.destination.clone(),
                &*form,
                errors
            )))
        }
    }
}

#[get("/logout")]
pub fn delete(mut cookies: Cookies<'_>) -> Redirect {
    if let Some(cookie) = cookies.get_private(AUTH_COOKIE) {
        cookies.remove_private(cookie);
    }
    Redirect::to("/")
}
