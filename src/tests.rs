use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use guid_create::GUID;
use plumelet_models::{
    comments::Comment,
    db_conn::DbPool,
    follows::Follow,
    groups::{Group, NewGroup},
    migrations,
    page_cache::PageCache,
    posts::{NewPost, Post},
    users::{NewUser, User},
    Connection,
};
use rocket::{
    http::{ContentType, Status},
    local::Client,
};
use std::thread::sleep;
use std::time::Duration;

const BOUNDARY: &str = "plumeletboundary";

struct TestApp {
    client: Client,
    pool: DbPool,
}

fn app() -> TestApp {
    app_with_ttl(Duration::from_secs(20))
}

fn app_with_ttl(ttl: Duration) -> TestApp {
    let db_path = std::env::temp_dir().join(format!("plumelet-test-{}.sqlite", GUID::rand()));
    let manager = ConnectionManager::<Connection>::new(db_path.to_str().unwrap());
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .expect("test pool");
    migrations::run(&pool.get().unwrap()).expect("test migrations");

    let client = Client::new(crate::rocket(
        rocket::Config::development(),
        pool.clone(),
        PageCache::new("home-feed", ttl),
    ))
    .expect("valid rocket instance");
    TestApp { client, pool }
}

impl TestApp {
    fn conn(&self) -> PooledConnection<ConnectionManager<Connection>> {
        self.pool.get().unwrap()
    }

    fn seed_user(&self, name: &str, password: &str) -> User {
        User::insert(&self.conn(), NewUser::new_local(name, name, password).unwrap()).unwrap()
    }

    fn seed_post(&self, author: &User, text: &str, group_id: Option<i32>) -> Post {
        Post::insert(
            &self.conn(),
            NewPost {
                text: text.to_owned(),
                creation_date: None,
                author_id: author.id,
                group_id,
                image_id: None,
            },
        )
        .unwrap()
    }

    fn login(&self, username: &str, password: &str) {
        let res = self
            .client
            .post("/login")
            .header(ContentType::Form)
            .body(format!("username={}&password={}", username, password))
            .dispatch();
        assert_eq!(Status::SeeOther, res.status());
    }

    fn post_form(&self, url: String, fields: &[(&str, &str)]) -> rocket::local::LocalResponse<'_> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        self.client
            .post(url)
            .header(
                format!("multipart/form-data; boundary={}", BOUNDARY)
                    .parse::<ContentType>()
                    .unwrap(),
            )
            .body(body)
            .dispatch()
    }
}

#[test]
fn global_feed_paginates_by_ten() {
    let app = app();
    let user = app.seed_user("paginator", "secret");
    for i in 0..13 {
        app.seed_post(&user, &format!("entry {:02}", i), None);
    }

    let mut res = app.client.get("/").dispatch();
    let body = res.body_string().unwrap();
    assert_eq!(10, body.matches(r#"class="post-card""#).count());
    assert!(body.contains("entry 12"));
    assert!(body.contains("entry 03"));
    assert!(!body.contains("entry 02"));

    let mut res = app.client.get("/?page=2").dispatch();
    let body = res.body_string().unwrap();
    assert_eq!(3, body.matches(r#"class="post-card""#).count());
    assert!(body.contains("entry 00"));

    // a page past the end resolves to the last page
    let mut res = app.client.get("/?page=99").dispatch();
    let body = res.body_string().unwrap();
    assert_eq!(3, body.matches(r#"class="post-card""#).count());
    assert!(body.contains("entry 00"));
}

#[test]
fn home_feed_cache_goes_stale_then_refreshes() {
    let app = app_with_ttl(Duration::from_millis(300));
    let user = app.seed_user("caching", "secret");
    app.seed_post(&user, "the original post", None);

    let mut res = app.client.get("/").dispatch();
    assert!(res.body_string().unwrap().contains("the original post"));

    // a post created inside the TTL window is not visible yet
    app.seed_post(&user, "a newcomer", None);
    let mut res = app.client.get("/").dispatch();
    let body = res.body_string().unwrap();
    assert!(!body.contains("a newcomer"));
    assert!(body.contains("the original post"));

    sleep(Duration::from_millis(350));
    let mut res = app.client.get("/").dispatch();
    assert!(res.body_string().unwrap().contains("a newcomer"));
}

#[test]
fn anonymous_comment_redirects_to_login_and_saves_nothing() {
    let app = app();
    let author = app.seed_user("author", "secret");
    let post = app.seed_post(&author, "comment on me", None);

    let res = app
        .client
        .post(format!("/posts/{}/comment", post.id))
        .header(ContentType::Form)
        .body("text=hello")
        .dispatch();
    assert_eq!(Status::SeeOther, res.status());
    let location = res.headers().get_one("Location").unwrap().to_string();
    assert!(location.starts_with("/login?destination="));
    let decoded = location.replace("%2F", "/");
    assert!(decoded.contains(&format!("destination=/posts/{}/comment", post.id)));
    assert_eq!(0, Comment::count_for_post(&app.conn(), post.id).unwrap());
}

#[test]
fn whitespace_post_is_rejected_and_not_persisted() {
    let app = app();
    app.seed_user("speaker", "secret");
    app.login("speaker", "secret");

    let mut res = app.post_form("/create".to_string(), &[("text", "   ")]);
    assert_eq!(Status::Ok, res.status());
    assert!(res
        .body_string()
        .unwrap()
        .contains("Your post cannot be empty"));
    assert_eq!(0, Post::count(&app.conn()).unwrap());
}

#[test]
fn creating_a_post_redirects_to_the_author_feed() {
    let app = app();
    let group = Group::insert(
        &app.conn(),
        NewGroup::new("Chatter", "chatter", "Everyday conversations").unwrap(),
    )
    .unwrap();
    app.seed_user("author", "secret");
    app.login("author", "secret");

    let res = app.post_form(
        "/create".to_string(),
        &[("text", "Hello everyone"), ("group", &group.id.to_string())],
    );
    assert_eq!(Status::SeeOther, res.status());
    assert_eq!(
        "/profile/author",
        res.headers().get_one("Location").unwrap()
    );

    let posts = Post::page_for_group(&app.conn(), &group, (0, 10)).unwrap();
    assert_eq!(1, posts.len());
    assert_eq!("Hello everyone", posts[0].text);
}

#[test]
fn non_author_edit_redirects_to_detail_and_changes_nothing() {
    let app = app();
    let author = app.seed_user("author", "secret");
    app.seed_user("intruder", "secret");
    let post = app.seed_post(&author, "untouchable", None);

    app.login("intruder", "secret");
    let res = app.client.get(format!("/posts/{}/edit", post.id)).dispatch();
    assert_eq!(Status::SeeOther, res.status());
    assert_eq!(
        post.url(),
        res.headers().get_one("Location").unwrap().to_string()
    );

    let res = app.post_form(format!("/posts/{}/edit", post.id), &[("text", "hacked")]);
    assert_eq!(Status::SeeOther, res.status());
    assert_eq!("untouchable", Post::get(&app.conn(), post.id).unwrap().text);
}

#[test]
fn the_author_can_edit_their_post() {
    let app = app();
    app.seed_user("author", "secret");
    app.login("author", "secret");
    let author = User::find_by_name(&app.conn(), "author").unwrap();
    let post = app.seed_post(&author, "first draft", None);

    let res = app.post_form(format!("/posts/{}/edit", post.id), &[("text", "final text")]);
    assert_eq!(Status::SeeOther, res.status());
    assert_eq!(
        post.url(),
        res.headers().get_one("Location").unwrap().to_string()
    );
    let updated = Post::get(&app.conn(), post.id).unwrap();
    assert_eq!("final text", updated.text);
    assert_eq!(post.creation_date, updated.creation_date);
}

#[test]
fn follow_is_idempotent_and_unfollow_tolerates_absence() {
    let app = app();
    let author = app.seed_user("author", "secret");
    app.seed_user("fan", "secret");
    app.login("fan", "secret");

    app.client.get("/profile/author/follow").dispatch();
    app.client.get("/profile/author/follow").dispatch();
    assert_eq!(1, Follow::count_followers(&app.conn(), author.id).unwrap());

    let res = app.client.get("/profile/author/unfollow").dispatch();
    assert_eq!(Status::SeeOther, res.status());
    assert_eq!(0, Follow::count_followers(&app.conn(), author.id).unwrap());

    // unfollowing someone you don't follow is not an error
    let res = app.client.get("/profile/author/unfollow").dispatch();
    assert_eq!(Status::SeeOther, res.status());

    // following yourself is silently ignored
    app.login("author", "secret");
    let res = app.client.get("/profile/author/follow").dispatch();
    assert_eq!(Status::SeeOther, res.status());
    assert_eq!(0, Follow::count_followers(&app.conn(), author.id).unwrap());
}

#[test]
fn personalized_feed_requires_login_and_filters_authors() {
    let app = app();
    let followed = app.seed_user("followed", "secret");
    let noise = app.seed_user("noise", "secret");
    app.seed_post(&followed, "from the followed author", None);
    app.seed_post(&noise, "background noise", None);

    let res = app.client.get("/feed").dispatch();
    assert_eq!(Status::SeeOther, res.status());
    assert!(res
        .headers()
        .get_one("Location")
        .unwrap()
        .starts_with("/login?destination="));

    app.seed_user("fan", "secret");
    app.login("fan", "secret");
    app.client.get("/profile/followed/follow").dispatch();
    let mut res = app.client.get("/feed").dispatch();
    assert_eq!(Status::Ok, res.status());
    let body = res.body_string().unwrap();
    assert!(body.contains("from the followed author"));
    assert!(!body.contains("background noise"));
}

#[test]
fn profile_reports_follow_state() {
    let app = app();
    app.seed_user("author", "secret");
    app.seed_user("fan", "secret");
    app.login("fan", "secret");

    let mut res = app.client.get("/profile/author").dispatch();
    assert!(res.body_string().unwrap().contains("/profile/author/follow"));

    app.client.get("/profile/author/follow").dispatch();
    let mut res = app.client.get("/profile/author").dispatch();
    assert!(res
        .body_string()
        .unwrap()
        .contains("/profile/author/unfollow"));
}

#[test]
fn unknown_resources_render_not_found() {
    let app = app();
    assert_eq!(
        Status::NotFound,
        app.client.get("/group/missing").dispatch().status()
    );
    assert_eq!(
        Status::NotFound,
        app.client.get("/profile/nobody").dispatch().status()
    );
    assert_eq!(
        Status::NotFound,
        app.client.get("/posts/999").dispatch().status()
    );
    assert_eq!(
        Status::NotFound,
        app.client.get("/completely/unknown").dispatch().status()
    );
}

#[test]
fn group_feed_only_shows_its_posts() {
    let app = app();
    let chatter = Group::insert(
        &app.conn(),
        NewGroup::new("Chatter", "chatter", "").unwrap(),
    )
    .unwrap();
    let poetry = Group::insert(&app.conn(), NewGroup::new("Poetry", "poetry", "").unwrap()).unwrap();
    let user = app.seed_user("author", "secret");
    app.seed_post(&user, "small talk", Some(chatter.id));
    app.seed_post(&user, "a sonnet", Some(poetry.id));

    let mut res = app.client.get("/group/chatter").dispatch();
    assert_eq!(Status::Ok, res.status());
    let body = res.body_string().unwrap();
    assert!(body.contains("small talk"));
    assert!(!body.contains("a sonnet"));
}

#[test]
fn bad_password_does_not_open_a_session() {
    let app = app();
    app.seed_user("cautious", "right");
    let mut res = app
        .client
        .post("/login")
        .header(ContentType::Form)
        .body("username=cautious&password=wrong")
        .dispatch();
    assert_eq!(Status::Ok, res.status());
    assert!(res
        .body_string()
        .unwrap()
        .contains("Invalid username or password"));

    // still anonymous: protected pages keep redirecting to the login form
    let res = app.client.get("/create").dispatch();
    assert_eq!(Status::SeeOther, res.status());
}

#[test]
fn logged_in_comment_lands_on_the_detail_page() {
    let app = app();
    let author = app.seed_user("author", "secret");
    let post = app.seed_post(&author, "comment on me", None);
    app.seed_user("reader", "secret");
    app.login("reader", "secret");

    let res = app
        .client
        .post(format!("/posts/{}/comment", post.id))
        .header(ContentType::Form)
        .body("text=well%20said")
        .dispatch();
    assert_eq!(Status::SeeOther, res.status());
    assert!(res
        .headers()
        .get_one("Location")
        .unwrap()
        .starts_with(&post.url()));

    let mut res = app.client.get(post.url()).dispatch();
    assert!(res.body_string().unwrap().contains("well said"));
    assert_eq!(1, Comment::count_for_post(&app.conn(), post.id).unwrap());
}
