//! Linked OAuth identities, one row per user and provider.

use super::schema::{
    ColumnDef, IndexDef, PolicyCommand, PolicyDef, References, TableSchema, TriggerDef,
    UniqueConstraint,
};

pub const PROVIDERS: &[&str] = &["google", "facebook", "github", "apple"];

const OWNER: &str = "auth.uid() = user_id";

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "uuid")
        .primary_key()
        .default("gen_random_uuid()"),
    ColumnDef::new("user_id", "uuid")
        .not_null()
        .references(References {
            table: "auth.users",
            column: "id",
            on_delete: Some("CASCADE"),
        }),
    ColumnDef::new("provider", "text")
        .not_null()
        .check_in(PROVIDERS),
    ColumnDef::new("provider_user_id", "text").not_null(),
    ColumnDef::new("email", "text"),
    ColumnDef::new("display_name", "text"),
    ColumnDef::new("avatar_url", "text"),
    ColumnDef::new("access_token", "text"),
    ColumnDef::new("refresh_token", "text"),
    ColumnDef::new("token_expires_at", "timestamptz"),
    ColumnDef::new("created_at", "timestamptz").default("now()"),
    ColumnDef::new("updated_at", "timestamptz").default("now()"),
];

const POLICIES: &[PolicyDef] = &[
    PolicyDef {
        name: "Users can view own OAuth providers",
        command: PolicyCommand::Select,
        role: "authenticated",
        using: Some(OWNER),
        with_check: None,
        owner_column: "user_id",
    },
    PolicyDef {
        name: "Users can insert own OAuth providers",
        command: PolicyCommand::Insert,
        role: "authenticated",
        using: None,
        with_check: Some(OWNER),
        owner_column: "user_id",
    },
    PolicyDef {
        name: "Users can update own OAuth providers",
        command: PolicyCommand::Update,
        role: "authenticated",
        using: Some(OWNER),
        with_check: Some(OWNER),
        owner_column: "user_id",
    },
    PolicyDef {
        name: "Users can delete own OAuth providers",
        command: PolicyCommand::Delete,
        role: "authenticated",
        using: Some(OWNER),
        with_check: None,
        owner_column: "user_id",
    },
];

pub const OAUTH_PROVIDERS: TableSchema = TableSchema {
    name: "oauth_providers",
    columns: COLUMNS,
    unique: &[UniqueConstraint {
        columns: &["user_id", "provider"],
    }],
    row_level_security: true,
    policies: POLICIES,
    indexes: &[
        IndexDef {
            name: "idx_oauth_providers_user_id",
            column: "user_id",
        },
        IndexDef {
            name: "idx_oauth_providers_provider",
            column: "provider",
        },
        IndexDef {
            name: "idx_oauth_providers_provider_user_id",
            column: "provider_user_id",
        },
    ],
    update_trigger: Some(TriggerDef {
        name: "update_oauth_providers_updated_at",
        function: "update_updated_at_column",
        column: "updated_at",
    }),
};
