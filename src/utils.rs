use rocket::http::uri::Uri;
use rocket::response::{Flash, Redirect};

/// Redirects to the login page with a given message, in a way that lets the
/// login form send the user back to `destination` once they are
/// authenticated.
///
/// Note that the message is displayed as-is and should be written for end
/// users.
pub fn requires_login(message: &str, destination: &str) -> Flash<Redirect> {
    Flash::error(
        Redirect::to(format!(
            "/login?destination={}",
            Uri::percent_encode(destination)
        )),
        message,
    )
}
