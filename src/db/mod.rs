use crate::errors::RemoteError;
use async_trait::async_trait;

pub mod postgres;

/// Rows returned by a probe, one JSON object per row.
pub type RowSet = Vec<serde_json::Value>;

/// The two remote operations provisioning relies on.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Reads at most one row from `table`.
    async fn probe(&self, table: &str) -> Result<RowSet, RemoteError>;
    /// Runs a schema-definition script as one unit.
    async fn execute(&self, statement: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl<E: RemoteExecutor + ?Sized> RemoteExecutor for &E {
    async fn probe(&self, table: &str) -> Result<RowSet, RemoteError> {
        (**self).probe(table).await
    }

    async fn execute(&self, statement: &str) -> Result<(), RemoteError> {
        (**self).execute(statement).await
    }
}

/// Accepts `name` or `schema.name` made of plain identifier characters.
pub fn is_plain_table_name(table: &str) -> bool {
    let parts: Vec<&str> = table.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_table_names() {
        assert!(is_plain_table_name("oauth_providers"));
        assert!(is_plain_table_name("public.oauth_providers"));
        assert!(is_plain_table_name("_t1"));

        assert!(!is_plain_table_name(""));
        assert!(!is_plain_table_name("1table"));
        assert!(!is_plain_table_name("a.b.c"));
        assert!(!is_plain_table_name("users; DROP TABLE users"));
        assert!(!is_plain_table_name("public."));
    }
}
