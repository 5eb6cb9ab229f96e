pub mod db;
pub mod errors;
pub mod models;
pub mod provisioner;

pub use db::{postgres::PostgresClient, RemoteExecutor, RowSet};
pub use errors::{DbError, RemoteError};
pub use models::{connections::ConnectionConfig, oauth::OAUTH_PROVIDERS, schema::TableSchema};
pub use provisioner::{ensure_table, ProbeResult, ProvisionOutcome, Provisioner};
