//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Embedded lists
//! (members, sprints, attachments) live in JSONB columns so each aggregate is
//! one row and membership writes lock a single record.

diesel::table! {
    /// User accounts. `username` and `email` carry unique constraints.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Text,
        /// PHC-format Argon2id hash.
        password_hash -> Text,
        role -> Text,
        status -> Text,
        /// Free-form profile fields as a JSON object.
        profile -> Jsonb,
        image_id -> Nullable<Uuid>,
        joined_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Groups with their membership list.
    groups (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        visibility -> Text,
        icon -> Nullable<Text>,
        is_active -> Bool,
        /// Array of `{userId, role, joinedAt}` objects.
        members -> Jsonb,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Projects with embedded members, sprints and board columns.
    projects (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        group_id -> Uuid,
        status -> Text,
        methodology -> Text,
        priority -> Text,
        start_date -> Nullable<Date>,
        target_end_date -> Nullable<Date>,
        actual_end_date -> Nullable<Date>,
        tags -> Array<Text>,
        metrics -> Jsonb,
        is_active -> Bool,
        members -> Jsonb,
        sprints -> Jsonb,
        kanban_columns -> Jsonb,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Notes with their attachment references.
    notes (id) {
        id -> Uuid,
        title -> Text,
        content -> Text,
        content_format -> Text,
        project_id -> Uuid,
        sprint_id -> Nullable<Uuid>,
        author_id -> Uuid,
        tags -> Array<Text>,
        status -> Text,
        is_public -> Bool,
        pinned -> Bool,
        attachments -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, groups, projects, notes);
