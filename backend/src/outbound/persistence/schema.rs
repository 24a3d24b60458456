//! Diesel table definitions matching `backend/migrations`.
//!
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered principals. Username and email are unique.
    accounts (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Text,
        /// `requester` or `mechanic`.
        role -> Text,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Mechanic profiles, one per mechanic account. Phone is unique.
    mechanics (id) {
        id -> Uuid,
        account_id -> Uuid,
        service_centre_name -> Text,
        phone -> Varchar,
        address -> Text,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        specialization -> Nullable<Varchar>,
        approved -> Bool,
        available -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Roadside assistance requests.
    service_requests (id) {
        id -> Uuid,
        requester_id -> Uuid,
        vehicle_type -> Text,
        vehicle_brand -> Text,
        vehicle_model -> Text,
        vehicle_year -> Int4,
        vehicle_number -> Text,
        owner_name -> Text,
        phone -> Varchar,
        location -> Text,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        service_type -> Text,
        /// `pending`, `accepted`, `completed` or `cancelled`.
        status -> Text,
        /// Selected mechanic while pending, assigned mechanic afterwards.
        mechanic_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ratings left by requesters. Unique per `(author_id, service_request_id)`.
    feedback (id) {
        id -> Uuid,
        author_id -> Uuid,
        mechanic_id -> Uuid,
        service_request_id -> Uuid,
        rating -> Int2,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(mechanics -> accounts (account_id));
diesel::joinable!(feedback -> service_requests (service_request_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, mechanics, service_requests, feedback);
