use plumelet_models::{db_conn::DbConn, users::User, Error};
use rocket::{
    http::Status,
    request::{FromRequest, Request},
    response::{self, Responder, Response},
};
use shrinkwraprs::Shrinkwrap;
use tracing::warn;

use crate::template_utils::Ructe;

#[derive(Shrinkwrap, Debug)]
pub struct ErrorPage(Error);

impl From<Error> for ErrorPage {
    fn from(err: Error) -> ErrorPage {
        ErrorPage(err)
    }
}

impl<'r> Responder<'r> for ErrorPage {
    fn respond_to(self, req: &Request<'_>) -> response::Result<'r> {
        warn!("{:?}", *self);
        let conn = req.guard::<DbConn>().succeeded();
        let user = User::from_request(req).succeeded();
        match conn {
            Some(conn) => {
                let (page, status) = match self.0 {
                    Error::NotFound => (
                        render!(errors::not_found(&(&*conn, user, None))),
                        Status::NotFound,
                    ),
                    Error::Unauthorized => (
                        render!(errors::forbidden(&(&*conn, user, None))),
                        Status::Forbidden,
                    ),
                    _ => (
                        render!(errors::server_error(&(&*conn, user, None))),
                        Status::InternalServerError,
                    ),
                };
                Response::build_from(page.respond_to(req)?)
                    .status(status)
                    .ok()
            }
            None => Err(Status::InternalServerError),
        }
    }
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> Ructe {
    let conn = req.guard::<DbConn>().succeeded();
    let user = conn
        .as_ref()
        .and_then(|_| User::from_request(req).succeeded());
    match conn {
        Some(conn) => render!(errors::not_found(&(&*conn, user, None))),
        None => Ructe(b"Page not found".to_vec()),
    }
}

#[catch(403)]
pub fn forbidden(req: &Request<'_>) -> Ructe {
    let conn = req.guard::<DbConn>().succeeded();
    let user = conn
        .as_ref()
        .and_then(|_| User::from_request(req).succeeded());
    match conn {
        Some(conn) => render!(errors::forbidden(&(&*conn, user, None))),
        None => Ructe(b"You are not allowed to do that".to_vec()),
    }
}

#[catch(500)]
pub fn server_error(req: &Request<'_>) -> Ructe {
    let conn = req.guard::<DbConn>().succeeded();
    let user = conn
        .as_ref()
        .and_then(|_| User::from_request(req).succeeded());
    match conn {
        Some(conn) => render!(errors::server_error(&(&*conn, user, None))),
        None => Ructe(b"Something went wrong".to_vec()),
    }
}
