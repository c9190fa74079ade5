//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User accounts.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        /// `user` or `admin`.
        role -> Varchar,
        active -> Bool,
        password_hash -> Nullable<Text>,
    }
}

diesel::table! {
    /// Catalogue products and their stock on hand.
    ///
    /// `quantity` carries a `CHECK (quantity >= 0)` constraint.
    products (id) {
        id -> Int8,
        name -> Varchar,
        description -> Nullable<Text>,
        price -> Numeric,
        quantity -> Int4,
        code -> Nullable<Varchar>,
        active -> Bool,
    }
}

diesel::table! {
    /// Order headers.
    orders (id) {
        id -> Int8,
        user_id -> Int8,
        status -> Varchar,
        total -> Numeric,
    }
}

diesel::table! {
    /// Order lines; removed with their order.
    order_lines (id) {
        id -> Int8,
        order_id -> Int8,
        product_id -> Int8,
        quantity -> Int4,
        unit_price -> Numeric,
        subtotal -> Numeric,
    }
}

diesel::table! {
    /// Per-recipient notifications.
    notifications (id) {
        id -> Int8,
        #[sql_name = "type"]
        kind -> Varchar,
        message -> Text,
        product_id -> Nullable<Int8>,
        recipient_id -> Int8,
        read -> Bool,
        level -> Varchar,
    }
}

diesel::joinable!(orders -> users (user_id));
diesel::joinable!(order_lines -> orders (order_id));
diesel::joinable!(order_lines -> products (product_id));
diesel::joinable!(notifications -> users (recipient_id));
diesel::joinable!(notifications -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(users, products, orders, order_lines, notifications);
