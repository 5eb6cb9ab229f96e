use serde::Serialize;

use crate::errors::DbError;

/// Desired definition of one table, built as a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub unique: &'static [UniqueConstraint],
    pub row_level_security: bool,
    pub policies: &'static [PolicyDef],
    pub indexes: &'static [IndexDef],
    pub update_trigger: Option<TriggerDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub data_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    pub default: Option<&'static str>,
    pub references: Option<References>,
    /// Allowed values, rendered as `CHECK (column IN (...))`.
    pub check: Option<&'static [&'static str]>,
}

impl ColumnDef {
    /// Nullable column with no constraints.
    pub const fn new(name: &'static str, data_type: &'static str) -> Self {
        Self {
            name,
            data_type,
            nullable: true,
            primary_key: false,
            default: None,
            references: None,
            check: None,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn default(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    pub const fn references(mut self, references: References) -> Self {
        self.references = Some(references);
        self
    }

    pub const fn check_in(mut self, values: &'static [&'static str]) -> Self {
        self.check = Some(values);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct References {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UniqueConstraint {
    pub columns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyCommand {
    Select,
    Insert,
    Update,
    Delete,
}

impl PolicyCommand {
    pub fn as_sql(&self) -> &'static str {
        match self {
            PolicyCommand::Select => "SELECT",
            PolicyCommand::Insert => "INSERT",
            PolicyCommand::Update => "UPDATE",
            PolicyCommand::Delete => "DELETE",
        }
    }
}

/// Row-level security policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyDef {
    pub name: &'static str,
    pub command: PolicyCommand,
    pub role: &'static str,
    pub using: Option<&'static str>,
    pub with_check: Option<&'static str>,
    /// Column holding the owning identity the predicates compare against.
    pub owner_column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexDef {
    pub name: &'static str,
    pub column: &'static str,
}

/// Trigger that stamps `column` with `now()` before every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerDef {
    pub name: &'static str,
    pub function: &'static str,
    pub column: &'static str,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks that every column named by a constraint, index, trigger or
    /// policy is declared.
    pub fn validate(&self) -> Result<(), DbError> {
        let dangling = |what: String, column: &str| {
            DbError::Schema(format!(
                "{} on table {} references unknown column {}",
                what, self.name, column
            ))
        };

        for unique in self.unique {
            for column in unique.columns {
                if self.column(column).is_none() {
                    return Err(dangling(
                        format!("unique constraint ({})", unique.columns.join(", ")),
                        column,
                    ));
                }
            }
        }
        for index in self.indexes {
            if self.column(index.column).is_none() {
                return Err(dangling(format!("index {}", index.name), index.column));
            }
        }
        for policy in self.policies {
            if self.column(policy.owner_column).is_none() {
                return Err(dangling(
                    format!("policy \"{}\"", policy.name),
                    policy.owner_column,
                ));
            }
        }
        if let Some(trigger) = &self.update_trigger {
            if self.column(trigger.column).is_none() {
                return Err(dangling(format!("trigger {}", trigger.name), trigger.column));
            }
        }

        Ok(())
    }
}
