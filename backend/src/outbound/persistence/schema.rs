//! Diesel table definitions mirroring `migrations/`.
//!
//! Keep in sync with the SQL migrations; these definitions are what Diesel
//! type-checks queries against.

diesel::table! {
    inquiries (id) {
        id -> Uuid,
        buyer_id -> Text,
        supplier_id -> Text,
        product_id -> Nullable<Text>,
        subject -> Text,
        message -> Text,
        quantity -> Int4,
        status -> Text,
        status_before_delete -> Nullable<Text>,
        supplier_reply -> Nullable<Text>,
        replied_at -> Nullable<Timestamptz>,
        buyer_reply -> Nullable<Text>,
        buyer_replied_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        revision -> Int4,
    }
}
