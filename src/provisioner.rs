//! Idempotent creation of a single table.
//!
//! [`Provisioner::ensure_table`] probes the table once and, only when the
//! database reports it as undefined, submits the whole definition once.
//! Any other probe failure is reported as is and nothing is created.

use log::{error, info, warn};

use crate::{
    db::{RemoteExecutor, RowSet},
    errors::{DbError, RemoteError},
    models::{connections::ProvisionMode, schema::TableSchema},
};

/// What the existence check observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Exists,
    NotFound,
    Error(RemoteError),
}

impl ProbeResult {
    /// Empty results still mean the table exists; only the undefined-table
    /// code means it does not.
    pub fn classify(result: Result<RowSet, RemoteError>) -> Self {
        match result {
            Ok(_) => ProbeResult::Exists,
            Err(err) if err.is_undefined_table() => ProbeResult::NotFound,
            Err(err) => ProbeResult::Error(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    AlreadyExists,
    Created,
    /// Print mode: the table is missing and this script must be run by hand.
    ManualActionRequired(String),
    ProbeFailed(RemoteError),
    CreationFailed(RemoteError),
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            ProvisionOutcome::ProbeFailed(_) | ProvisionOutcome::CreationFailed(_)
        )
    }

    pub fn into_result(self) -> Result<ProvisionOutcome, DbError> {
        match self {
            ProvisionOutcome::ProbeFailed(err) | ProvisionOutcome::CreationFailed(err) => {
                Err(DbError::Remote(err))
            }
            outcome => Ok(outcome),
        }
    }
}

pub struct Provisioner<E> {
    executor: E,
    mode: ProvisionMode,
}

impl<E: RemoteExecutor> Provisioner<E> {
    pub fn new(executor: E) -> Self {
        Self::with_mode(executor, ProvisionMode::Execute)
    }

    pub fn with_mode(executor: E, mode: ProvisionMode) -> Self {
        Self { executor, mode }
    }

    pub async fn probe(&self, schema: &TableSchema) -> ProbeResult {
        ProbeResult::classify(self.executor.probe(schema.name).await)
    }

    /// Makes sure `schema` exists remotely. No retries: each remote call is
    /// attempted once and its error, if any, is returned untouched.
    pub async fn ensure_table(&self, schema: &TableSchema) -> ProvisionOutcome {
        info!("Checking for {} table...", schema.name);

        match self.probe(schema).await {
            ProbeResult::Exists => {
                info!("Table {} already exists", schema.name);
                ProvisionOutcome::AlreadyExists
            }
            ProbeResult::Error(err) => {
                error!("Error checking table {}: {}", schema.name, err);
                ProvisionOutcome::ProbeFailed(err)
            }
            ProbeResult::NotFound => {
                let statement = schema.create_statement();
                match self.mode {
                    ProvisionMode::Print => {
                        warn!(
                            "Table {} does not exist; it must be created manually",
                            schema.name
                        );
                        ProvisionOutcome::ManualActionRequired(statement)
                    }
                    ProvisionMode::Execute => {
                        info!("Table {} does not exist. Creating it now...", schema.name);
                        match self.executor.execute(&statement).await {
                            Ok(()) => {
                                info!("Table {} created", schema.name);
                                ProvisionOutcome::Created
                            }
                            Err(err) => {
                                error!("Error creating table {}: {}", schema.name, err);
                                ProvisionOutcome::CreationFailed(err)
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Runs [`Provisioner::ensure_table`] in execute mode.
pub async fn ensure_table<E: RemoteExecutor>(
    executor: E,
    schema: &TableSchema,
) -> ProvisionOutcome {
    Provisioner::new(executor).ensure_table(schema).await
}
