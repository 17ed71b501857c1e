//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Profiles synchronised from the identity provider.
    users (id) {
        /// Identity provider user id.
        id -> Text,
        first_name -> Nullable<Text>,
        last_name -> Nullable<Text>,
        username -> Nullable<Text>,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lendable assets.
    assets (id) {
        id -> Uuid,
        owner_user_id -> Text,
        item_name -> Text,
        brand_name -> Nullable<Text>,
        category -> Nullable<Text>,
        current_location -> Nullable<Text>,
        images -> Array<Text>,
        condition_description -> Nullable<Text>,
        favorite -> Bool,
        /// One of `available`, `borrowed`, `in_repair`, `unlisted`.
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Borrow requests. `owner_user_id` is a snapshot taken at creation.
    borrow_requests (id) {
        id -> Uuid,
        asset_id -> Uuid,
        owner_user_id -> Text,
        borrower_user_id -> Text,
        status -> Text,
        requested_at -> Timestamptz,
        requested_from -> Nullable<Timestamptz>,
        requested_until -> Nullable<Timestamptz>,
        message -> Nullable<Text>,
        reviewed_at -> Nullable<Timestamptz>,
        due_at -> Nullable<Timestamptz>,
        returned_at -> Nullable<Timestamptz>,
        owner_note -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, assets, borrow_requests);
