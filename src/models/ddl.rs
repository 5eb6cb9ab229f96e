//! Renders a [`TableSchema`] into the SQL that creates it.

use super::schema::{ColumnDef, PolicyDef, TableSchema};

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Read-only query returning at most one row of `table`, without reading
/// any of its columns.
pub fn probe_sql(table: &str) -> String {
    format!("SELECT 1 AS present FROM {} LIMIT 1", table)
}

impl TableSchema {
    pub fn probe_statement(&self) -> String {
        probe_sql(self.name)
    }

    /// Full definition as one script: table, row-level security, policies,
    /// indexes and the update trigger. Every step is safe to run again.
    /// The trigger function is created only if missing; an existing one may
    /// be shared with other tables and is left untouched.
    pub fn create_statement(&self) -> String {
        let mut sql = String::new();

        sql.push_str(&format!("CREATE TABLE IF NOT EXISTS {} (\n", self.name));
        let mut lines: Vec<String> = self.columns.iter().map(column_sql).collect();
        for unique in self.unique {
            lines.push(format!("UNIQUE({})", unique.columns.join(", ")));
        }
        sql.push_str(
            &lines
                .iter()
                .map(|line| format!("  {}", line))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        sql.push_str("\n);\n");

        if self.row_level_security {
            sql.push_str(&format!(
                "\nALTER TABLE {} ENABLE ROW LEVEL SECURITY;\n",
                self.name
            ));
        }

        for policy in self.policies {
            sql.push('\n');
            sql.push_str(&self.policy_sql(policy));
        }

        if !self.indexes.is_empty() {
            sql.push('\n');
        }
        for index in self.indexes {
            sql.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}({});\n",
                index.name, self.name, index.column
            ));
        }

        if let Some(trigger) = &self.update_trigger {
            sql.push_str(&format!(
                r#"
DO $guard$
BEGIN
  IF to_regprocedure('{function}()') IS NULL THEN
    CREATE FUNCTION {function}()
    RETURNS trigger AS $fn$
    BEGIN
      NEW.{column} = now();
      RETURN NEW;
    END;
    $fn$ LANGUAGE plpgsql;
  END IF;
END
$guard$;

DROP TRIGGER IF EXISTS {trigger} ON {table};
CREATE TRIGGER {trigger}
  BEFORE UPDATE ON {table}
  FOR EACH ROW
  EXECUTE FUNCTION {function}();
"#,
                function = trigger.function,
                column = trigger.column,
                trigger = trigger.name,
                table = self.name,
            ));
        }

        sql
    }

    fn policy_sql(&self, policy: &PolicyDef) -> String {
        let name = quote_ident(policy.name);
        let mut sql = format!(
            "DROP POLICY IF EXISTS {name} ON {table};\n\
             CREATE POLICY {name}\n  ON {table} FOR {command} TO {role}",
            name = name,
            table = self.name,
            command = policy.command.as_sql(),
            role = policy.role,
        );
        if let Some(using) = policy.using {
            sql.push_str(&format!("\n  USING ({})", using));
        }
        if let Some(with_check) = policy.with_check {
            sql.push_str(&format!("\n  WITH CHECK ({})", with_check));
        }
        sql.push_str(";\n");
        sql
    }
}

fn column_sql(column: &ColumnDef) -> String {
    let mut sql = format!("{} {}", column.name, column.data_type);
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
    }
    if let Some(default) = column.default {
        sql.push_str(&format!(" DEFAULT {}", default));
    }
    if let Some(references) = &column.references {
        sql.push_str(&format!(
            " REFERENCES {}({})",
            references.table, references.column
        ));
        if let Some(action) = references.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action));
        }
    }
    if !column.nullable && !column.primary_key {
        sql.push_str(" NOT NULL");
    }
    if let Some(values) = column.check {
        let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
        sql.push_str(&format!(" CHECK ({} IN ({}))", column.name, values.join(", ")));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::{IndexDef, PolicyCommand, References, TriggerDef, UniqueConstraint};

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", "uuid")
            .primary_key()
            .default("gen_random_uuid()"),
        ColumnDef::new("owner_id", "uuid").not_null().references(References {
            table: "auth.users",
            column: "id",
            on_delete: Some("CASCADE"),
        }),
        ColumnDef::new("kind", "text")
            .not_null()
            .check_in(&["a", "it's"]),
        ColumnDef::new("updated_at", "timestamptz").default("now()"),
    ];

    const POLICIES: &[PolicyDef] = &[PolicyDef {
        name: "Owner \"can\" read",
        command: PolicyCommand::Select,
        role: "authenticated",
        using: Some("auth.uid() = owner_id"),
        with_check: None,
        owner_column: "owner_id",
    }];

    const NOTES: TableSchema = TableSchema {
        name: "notes",
        columns: COLUMNS,
        unique: &[UniqueConstraint {
            columns: &["owner_id", "kind"],
        }],
        row_level_security: true,
        policies: POLICIES,
        indexes: &[IndexDef {
            name: "idx_notes_owner_id",
            column: "owner_id",
        }],
        update_trigger: Some(TriggerDef {
            name: "touch_notes",
            function: "touch_updated_at",
            column: "updated_at",
        }),
    };

    #[test]
    fn test_column_rendering() {
        assert_eq!(
            column_sql(&COLUMNS[0]),
            "id uuid PRIMARY KEY DEFAULT gen_random_uuid()"
        );
        assert_eq!(
            column_sql(&COLUMNS[1]),
            "owner_id uuid REFERENCES auth.users(id) ON DELETE CASCADE NOT NULL"
        );
        assert_eq!(
            column_sql(&COLUMNS[2]),
            "kind text NOT NULL CHECK (kind IN ('a', 'it''s'))"
        );
    }

    #[test]
    fn test_create_statement_sections_in_order() {
        let sql = NOTES.create_statement();

        let table = sql.find("CREATE TABLE IF NOT EXISTS notes (").unwrap();
        let rls = sql.find("ALTER TABLE notes ENABLE ROW LEVEL SECURITY;").unwrap();
        let policy = sql.find("CREATE POLICY").unwrap();
        let index = sql
            .find("CREATE INDEX IF NOT EXISTS idx_notes_owner_id ON notes(owner_id);")
            .unwrap();
        let trigger = sql.find("CREATE TRIGGER touch_notes").unwrap();
        assert!(table < rls && rls < policy && policy < index && index < trigger);

        assert!(sql.contains("  UNIQUE(owner_id, kind)\n);"));
    }

    #[test]
    fn test_policy_name_is_quoted_and_rerunnable() {
        let sql = NOTES.create_statement();

        assert!(sql.contains("DROP POLICY IF EXISTS \"Owner \"\"can\"\" read\" ON notes;"));
        assert!(sql.contains(
            "CREATE POLICY \"Owner \"\"can\"\" read\"\n  ON notes FOR SELECT TO authenticated\n  USING (auth.uid() = owner_id);"
        ));
        assert!(!sql.contains("WITH CHECK"));
    }

    #[test]
    fn test_trigger_defines_its_function_only_when_missing() {
        let sql = NOTES.create_statement();

        assert!(sql.contains("IF to_regprocedure('touch_updated_at()') IS NULL THEN"));
        assert!(sql.contains("    CREATE FUNCTION touch_updated_at()"));
        assert!(sql.contains("NEW.updated_at = now();"));
        assert!(!sql.contains("CREATE OR REPLACE FUNCTION"));

        let guard = sql.find("IF to_regprocedure").unwrap();
        let create = sql.find("CREATE FUNCTION").unwrap();
        let end = sql.find("END IF;").unwrap();
        assert!(guard < create && create < end);
        assert!(sql.contains("DROP TRIGGER IF EXISTS touch_notes ON notes;"));
        assert!(sql.contains("EXECUTE FUNCTION touch_updated_at();"));
    }

    #[test]
    fn test_shared_trigger_function_is_never_replaced() {
        const AUDIT_COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("id", "bigint").primary_key(),
            ColumnDef::new("modified_at", "timestamptz").default("now()"),
        ];
        let audit_log = TableSchema {
            name: "audit_log",
            columns: AUDIT_COLUMNS,
            unique: &[],
            row_level_security: false,
            policies: &[],
            indexes: &[],
            update_trigger: Some(TriggerDef {
                name: "update_audit_log_modified_at",
                function: "update_updated_at_column",
                column: "modified_at",
            }),
        };

        let sql = audit_log.create_statement();
        assert!(!sql.contains("CREATE OR REPLACE FUNCTION update_updated_at_column()"));
        assert!(sql.contains("IF to_regprocedure('update_updated_at_column()') IS NULL THEN"));
        assert!(sql.contains("EXECUTE FUNCTION update_updated_at_column();"));
    }

    #[test]
    fn test_minimal_schema_has_only_table() {
        const PLAIN_COLUMNS: &[ColumnDef] = &[ColumnDef::new("id", "bigint").primary_key()];
        let schema = TableSchema {
            name: "plain",
            columns: PLAIN_COLUMNS,
            unique: &[],
            row_level_security: false,
            policies: &[],
            indexes: &[],
            update_trigger: None,
        };

        assert_eq!(
            schema.create_statement(),
            "CREATE TABLE IF NOT EXISTS plain (\n  id bigint PRIMARY KEY\n);\n"
        );
        assert_eq!(
            schema.probe_statement(),
            "SELECT 1 AS present FROM plain LIMIT 1"
        );
    }
}
