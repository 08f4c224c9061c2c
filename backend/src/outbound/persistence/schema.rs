//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after a migration changes a table, then restore the
//! `sql_name` renames below.

diesel::table! {
    /// Accounts registered by the auth collaborator.
    users (id) {
        id -> Int4,
        email -> Varchar,
        password_hash -> Varchar,
        name -> Varchar,
        avatar_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tracked products. `deleted_at` marks rows moved to the trash.
    products (id) {
        id -> Int4,
        user_id -> Int4,
        url -> Text,
        image_url -> Nullable<Text>,
        notes -> Text,
        purchased -> Bool,
        /// Set when `purchased` flips to true, cleared when it flips back.
        purchased_at -> Nullable<Timestamptz>,
        /// Denormalised sum of `video_logs.count` for the product.
        video_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Globally unique tag names shared by every user.
    tags (id) {
        id -> Int4,
        name -> Varchar,
        color -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    product_tags (product_id, tag_id) {
        product_id -> Int4,
        tag_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Monthly targets, unique per `(user_id, month, year)`.
    goals (id) {
        id -> Int4,
        user_id -> Int4,
        month -> Int4,
        year -> Int4,
        product_goal -> Int4,
        video_goal -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    category_goals (id) {
        id -> Int4,
        goal_id -> Int4,
        tag_id -> Int4,
        product_goal -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per product per calendar day.
    video_logs (id) {
        id -> Int4,
        product_id -> Int4,
        date -> Date,
        #[sql_name = "count"]
        video_total -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(products -> users (user_id));
diesel::joinable!(product_tags -> products (product_id));
diesel::joinable!(product_tags -> tags (tag_id));
diesel::joinable!(goals -> users (user_id));
diesel::joinable!(category_goals -> goals (goal_id));
diesel::joinable!(category_goals -> tags (tag_id));
diesel::joinable!(video_logs -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    products,
    tags,
    product_tags,
    goals,
    category_goals,
    video_logs,
);
