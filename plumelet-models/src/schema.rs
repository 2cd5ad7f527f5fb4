table! {
    comments (id) {
        id -> Int4,
        text -> Text,
        creation_date -> Timestamp,
        author_id -> Int4,
        post_id -> Int4,
    }
}

table! {
    follows (id) {
        id -> Int4,
        follower_id -> Int4,
        following_id -> Int4,
    }
}

table! {
    groups (id) {
        id -> Int4,
        title -> Varchar,
        slug -> Varchar,
        description -> Text,
    }
}

table! {
    medias (id) {
        id -> Int4,
        file_path -> Text,
        alt_text -> Text,
        owner_id -> Int4,
    }
}

table! {
    posts (id) {
        id -> Int4,
        text -> Text,
        creation_date -> Timestamp,
        author_id -> Int4,
        group_id -> Nullable<Int4>,
        image_id -> Nullable<Int4>,
    }
}

table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        display_name -> Varchar,
        hashed_password -> Nullable<Text>,
        creation_date -> Timestamp,
    }
}

joinable!(comments -> posts (post_id));
joinable!(comments -> users (author_id));
joinable!(medias -> users (owner_id));
joinable!(posts -> groups (group_id));
joinable!(posts -> users (author_id));

allow_tables_to_appear_in_same_query!(comments, follows, groups, medias, posts, users);
