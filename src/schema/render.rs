// ABOUTME: Renders an introspected schema definition as executable DDL
// ABOUTME: Emits sequences, then tables, then foreign keys and indexes

use super::{SchemaDef, TableDef};
use crate::utils::{quote_ident, quote_table};
use std::fmt::Write;

/// Render a schema definition as a DDL script.
///
/// Statement ordering makes the script order-independent with respect to
/// table relationships: sequences come first so column defaults resolve,
/// foreign keys are deferred to trailing ALTER TABLE statements so referenced
/// tables always exist before the constraint is created.
pub fn render_schema(schema: &SchemaDef) -> String {
    let mut out = String::new();

    out.push_str("-- Structural definition of schema \"public\"\n");
    out.push_str("-- Generated by postgres-csv-backup\n\n");

    for sequence in &schema.sequences {
        let _ = writeln!(
            out,
            "CREATE SEQUENCE IF NOT EXISTS \"public\".{};",
            quote_ident(&sequence.name)
        );
    }
    if !schema.sequences.is_empty() {
        out.push('\n');
    }

    for table in &schema.tables {
        out.push_str(&render_table(table));
        out.push('\n');
    }

    // Re-attach serial sequences to their columns so DROP TABLE keeps
    // cascading to them after a restore.
    for sequence in &schema.sequences {
        if let Some((table, column)) = &sequence.owned_by {
            let _ = writeln!(
                out,
                "ALTER SEQUENCE \"public\".{} OWNED BY {}.{};",
                quote_ident(&sequence.name),
                quote_table(table),
                quote_ident(column)
            );
        }
    }

    for table in &schema.tables {
        for constraint in table.constraints.iter().filter(|c| c.is_foreign_key()) {
            let _ = writeln!(
                out,
                "ALTER TABLE ONLY {} ADD CONSTRAINT {} {};",
                quote_table(&table.name),
                quote_ident(&constraint.name),
                constraint.definition
            );
        }
    }

    for table in &schema.tables {
        for index in &table.indexes {
            let _ = writeln!(out, "{};", index.trim_end_matches(';'));
        }
    }

    out
}

/// Render one CREATE TABLE statement with inline local constraints.
fn render_table(table: &TableDef) -> String {
    let mut lines: Vec<String> = Vec::new();

    for column in &table.columns {
        let mut line = format!("    {} {}", quote_ident(&column.name), column.data_type);
        if let Some(default) = &column.default {
            let _ = write!(line, " DEFAULT {}", default);
        }
        if column.not_null {
            line.push_str(" NOT NULL");
        }
        lines.push(line);
    }

    // Primary key, unique, and check constraints stay inline; foreign keys
    // are emitted after all tables exist.
    for constraint in table.constraints.iter().filter(|c| !c.is_foreign_key()) {
        lines.push(format!(
            "    CONSTRAINT {} {}",
            quote_ident(&constraint.name),
            constraint.definition
        ));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);\n",
        quote_table(&table.name),
        lines.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postgres::catalog::{ColumnDef, ConstraintDef, SequenceDef};

    fn sample_schema() -> SchemaDef {
        SchemaDef {
            sequences: vec![SequenceDef {
                name: "users_id_seq".to_string(),
                owned_by: Some(("users".to_string(), "id".to_string())),
            }],
            tables: vec![
                TableDef {
                    name: "users".to_string(),
                    columns: vec![
                        ColumnDef {
                            name: "id".to_string(),
                            data_type: "integer".to_string(),
                            not_null: true,
                            default: Some("nextval('users_id_seq'::regclass)".to_string()),
                        },
                        ColumnDef {
                            name: "name".to_string(),
                            data_type: "text".to_string(),
                            not_null: true,
                            default: None,
                        },
                    ],
                    constraints: vec![ConstraintDef {
                        name: "users_pkey".to_string(),
                        contype: "p".to_string(),
                        definition: "PRIMARY KEY (id)".to_string(),
                    }],
                    indexes: vec![
                        "CREATE INDEX users_name_idx ON public.users USING btree (name)"
                            .to_string(),
                    ],
                },
                TableDef {
                    name: "orders".to_string(),
                    columns: vec![
                        ColumnDef {
                            name: "id".to_string(),
                            data_type: "integer".to_string(),
                            not_null: true,
                            default: None,
                        },
                        ColumnDef {
                            name: "user_id".to_string(),
                            data_type: "integer".to_string(),
                            not_null: false,
                            default: None,
                        },
                    ],
                    constraints: vec![
                        ConstraintDef {
                            name: "orders_pkey".to_string(),
                            contype: "p".to_string(),
                            definition: "PRIMARY KEY (id)".to_string(),
                        },
                        ConstraintDef {
                            name: "orders_user_id_fkey".to_string(),
                            contype: "f".to_string(),
                            definition: "FOREIGN KEY (user_id) REFERENCES users(id)".to_string(),
                        },
                    ],
                    indexes: vec![],
                },
            ],
        }
    }

    #[test]
    fn sequences_precede_tables() {
        let sql = render_schema(&sample_schema());
        let seq_pos = sql.find("CREATE SEQUENCE").unwrap();
        let table_pos = sql.find("CREATE TABLE").unwrap();
        assert!(seq_pos < table_pos);
    }

    #[test]
    fn local_constraints_are_inline() {
        let sql = render_schema(&sample_schema());
        assert!(sql.contains("CONSTRAINT \"users_pkey\" PRIMARY KEY (id)"));
    }

    #[test]
    fn foreign_keys_follow_all_tables() {
        let sql = render_schema(&sample_schema());
        let fk_pos = sql.find("ALTER TABLE ONLY \"public\".\"orders\"").unwrap();
        let last_table_pos = sql.rfind("CREATE TABLE").unwrap();
        assert!(fk_pos > last_table_pos);
        assert!(sql.contains(
            "ADD CONSTRAINT \"orders_user_id_fkey\" FOREIGN KEY (user_id) REFERENCES users(id);"
        ));
        // The FK must not appear inside the CREATE TABLE body.
        let create_orders = sql
            .split("ALTER TABLE")
            .next()
            .unwrap();
        assert!(!create_orders.contains("FOREIGN KEY"));
    }

    #[test]
    fn column_attributes_are_rendered() {
        let sql = render_schema(&sample_schema());
        assert!(sql
            .contains("\"id\" integer DEFAULT nextval('users_id_seq'::regclass) NOT NULL"));
        assert!(sql.contains("\"name\" text NOT NULL"));
        assert!(sql.contains("\"user_id\" integer,\n"));
    }

    #[test]
    fn standalone_indexes_are_emitted_once_with_terminator() {
        let sql = render_schema(&sample_schema());
        assert!(sql.contains(
            "CREATE INDEX users_name_idx ON public.users USING btree (name);\n"
        ));
    }

    #[test]
    fn owned_sequences_are_reattached_after_tables() {
        let sql = render_schema(&sample_schema());
        let owned_pos = sql
            .find("ALTER SEQUENCE \"public\".\"users_id_seq\" OWNED BY \"public\".\"users\".\"id\";")
            .unwrap();
        let last_table_pos = sql.rfind("CREATE TABLE").unwrap();
        assert!(owned_pos > last_table_pos);
    }

    #[test]
    fn empty_schema_renders_header_only() {
        let sql = render_schema(&SchemaDef::default());
        assert!(sql.starts_with("-- Structural definition"));
        assert!(!sql.contains("CREATE"));
    }
}
