use guid_create::GUID;
use multipart::server::{
    save::{Entries, SaveResult, SavedData, SavedField},
    Multipart,
};
use rocket::{
    http::ContentType,
    request::FlashMessage,
    response::{Flash, Redirect},
    Data,
};
use std::fs;
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::routes::{comments::NewCommentForm, errors::ErrorPage, flash_msg};
use crate::template_utils::Ructe;
use crate::utils;
use plumelet_models::{
    comments::Comment,
    db_conn::DbConn,
    groups::Group,
    medias::{Media, NewMedia},
    posts::{NewPost, Post},
    users::User,
    Error, CONFIG,
};

#[derive(Default, Validate)]
pub struct NewPostForm {
    #[validate(custom(
        function = "crate::routes::not_blank",
        message = "Your post cannot be empty"
    ))]
    pub text: String,
    pub group: Option<i32>,
    pub alt: String,
}

#[get("/posts/<id>")]
pub fn details(
    id: i32,
    conn: DbConn,
    user: Option<User>,
    flash: Option<FlashMessage<'_, '_>>,
) -> Result<Ructe, ErrorPage> {
    let post = Post::get(&conn, id)?;
    let comments = Comment::list_for_post(&conn, post.id)?;
    Ok(render!(posts::details(
        &(&*conn, user, flash_msg(flash)),
        post,
        comments,
        &NewCommentForm::default(),
        ValidationErrors::new()
    )))
}

#[get("/create")]
pub fn new(user: User, conn: DbConn) -> Result<Ructe, ErrorPage> {
    edit_form(
        &conn,
        &user,
        "New post",
        "/create".to_string(),
        &NewPostForm::default(),
        ValidationErrors::new(),
    )
}

#[get("/create", rank = 2)]
pub fn new_auth() -> Flash<Redirect> {
    utils::requires_login("You need to be logged in to publish a post", "/create")
}

#[post("/create", data = "<data>")]
pub fn create(
    user: User,
    ct: &ContentType,
    data: Data,
    conn: DbConn,
) -> Result<Flash<Redirect>, Result<Ructe, ErrorPage>> {
    let entries = parse_form_data(ct, data).map_err(|e| Err(ErrorPage::from(e)))?;
    let form = form_from_entries(&entries);
    if let Err(errors) = form.validate() {
        return match edit_form(&conn, &user, "New post", "/create".to_string(), &form, errors) {
            Ok(page) => Err(Ok(page)),
            Err(e) => Err(Err(e)),
        };
    }

    let group_id = match form.group {
        Some(id) => Some(
            Group::get(&conn, id)
                .map_err(|e| Err(ErrorPage::from(e)))?
                .id,
        ),
        None => None,
    };
    let image_id = match entries.fields.get("image").and_then(|v| v.iter().next()) {
        Some(field) => {
            save_image(&conn, &user, field, &form.alt).map_err(|e| Err(ErrorPage::from(e)))?
        }
        None => None,
    };

    let post = Post::insert(
        &conn,
        NewPost {
            text: form.text.clone(),
            creation_date: None,
            author_id: user.id,
            group_id,
            image_id,
        },
    )
    .map_err(|e| Err(ErrorPage::from(e)))?;
    info!("post {} published by {}", post.id, user.username);

    Ok(Flash::success(
        Redirect::to(format!("/profile/{}", user.username)),
        "Your post has been published",
    ))
}

#[post("/create", rank = 2)]
pub fn create_auth() -> Flash<Redirect> {
    utils::requires_login("You need to be logged in to publish a post", "/create")
}

#[get("/posts/<id>/edit")]
pub fn edit(id: i32, user: User, conn: DbConn) -> Result<Result<Ructe, Redirect>, ErrorPage> {
    let post = Post::get(&conn, id)?;
    if post.author_id != user.id {
        return Ok(Err(Redirect::to(post.url())));
    }
    let form = NewPostForm {
        text: post.text.clone(),
        group: post.group_id,
        alt: String::new(),
    };
    edit_form(
        &conn,
        &user,
        "Edit your post",
        format!("/posts/{}/edit", id),
        &form,
        ValidationErrors::new(),
    )
    .map(Ok)
}

#[get("/posts/<id>/edit", rank = 2)]
pub fn edit_auth(id: i32) -> Flash<Redirect> {
    utils::requires_login(
        "You need to be logged in to edit your post",
        &format!("/posts/{}/edit", id),
    )
}

#[post("/posts/<id>/edit", data = "<data>")]
pub fn update(
    id: i32,
    user: User,
    ct: &ContentType,
    data: Data,
    conn: DbConn,
) -> Result<Flash<Redirect>, Result<Ructe, ErrorPage>> {
    let mut post = Post::get(&conn, id).map_err(|e| Err(ErrorPage::from(e)))?;
    if post.author_id != user.id {
        return Ok(Flash::error(
            Redirect::to(post.url()),
            "Only the author of a post can edit it",
        ));
    }

    let entries = parse_form_data(ct, data).map_err(|e| Err(ErrorPage::from(e)))?;
    let form = form_from_entries(&entries);
    if let Err(errors) = form.validate() {
        return match edit_form(
            &conn,
            &user,
            "Edit your post",
            format!("/posts/{}/edit", id),
            &form,
            errors,
        ) {
            Ok(page) => Err(Ok(page)),
            Err(e) => Err(Err(e)),
        };
    }

    post.text = form.text.clone();
    post.group_id = match form.group {
        Some(gid) => Some(
            Group::get(&conn, gid)
                .map_err(|e| Err(ErrorPage::from(e)))?
                .id,
        ),
        None => None,
    };
    if let Some(field) = entries.fields.get("image").and_then(|v| v.iter().next()) {
        if let Some(image_id) =
            save_image(&conn, &user, field, &form.alt).map_err(|e| Err(ErrorPage::from(e)))?
        {
            post.image_id = Some(image_id);
        }
    }

    let post = post.update(&conn).map_err(|e| Err(ErrorPage::from(e)))?;
    info!("post {} edited by {}", post.id, user.username);

    Ok(Flash::success(
        Redirect::to(post.url()),
        "Your post has been updated",
    ))
}

#[post("/posts/<id>/edit", rank = 2)]
pub fn update_auth(id: i32) -> Flash<Redirect> {
    utils::requires_login(
        "You need to be logged in to edit your post",
        &format!("/posts/{}/edit", id),
    )
}

fn edit_form(
    conn: &DbConn,
    user: &User,
    title: &str,
    action: String,
    form: &NewPostForm,
    errors: ValidationErrors,
) -> Result<Ructe, ErrorPage> {
    let groups = Group::list(conn)?;
    Ok(render!(posts::new(
        &(&**conn, Some(user.clone()), None),
        title.to_string(),
        action,
        form,
        errors,
        groups
    )))
}

fn parse_form_data(ct: &ContentType, data: Data) -> Result<Entries, Error> {
    if !ct.is_form_data() {
        return Err(Error::InvalidValue);
    }
    let (_, boundary) = ct
        .params()
        .find(|&(k, _)| k == "boundary")
        .ok_or(Error::InvalidValue)?;

    match Multipart::with_body(data.open(), boundary).save().temp() {
        SaveResult::Full(entries) => Ok(entries),
        SaveResult::Partial(_, _) | SaveResult::Error(_) => Err(Error::InvalidValue),
    }
}

fn form_from_entries(entries: &Entries) -> NewPostForm {
    NewPostForm {
        text: text_field(entries, "text").unwrap_or_default(),
        group: text_field(entries, "group").and_then(|v| v.parse::<i32>().ok()),
        alt: text_field(entries, "alt").unwrap_or_default(),
    }
}

fn text_field(entries: &Entries, name: &str) -> Option<String> {
    entries
        .fields
        .get(name)
        .and_then(|v| v.iter().next())
        .and_then(|f| match f.data {
            SavedData::Text(ref s) => Some(s.clone()),
            _ => None,
        })
}

/// Writes an uploaded image under the media directory and records it,
/// returning its id. An empty file input is not an upload.
fn save_image(
    conn: &DbConn,
    user: &User,
    field: &SavedField,
    alt: &str,
) -> Result<Option<i32>, Error> {
    let filename = match field.headers.filename.clone() {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(None),
    };
    let ext = filename
        .rsplit('.')
        .next()
        .map(|ext| ext.to_owned())
        .unwrap_or_else(|| "png".to_owned());

    fs::create_dir_all(&CONFIG.media_directory)?;
    let dest = format!("{}/{}.{}", CONFIG.media_directory, GUID::rand(), ext);
    match field.data {
        SavedData::Bytes(ref bytes) => fs::write(&dest, bytes)?,
        SavedData::File(ref path, _) => {
            fs::copy(path, &dest)?;
        }
        _ => return Ok(None),
    }

    let media = Media::insert(
        &**conn,
        NewMedia {
            file_path: dest,
            alt_text: alt.to_owned(),
            owner_id: user.id,
        },
    )?;
    Ok(Some(media.id))
}
