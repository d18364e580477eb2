// ABOUTME: Catalog queries for table enumeration and schema introspection
// ABOUTME: Reads pg_catalog to discover tables, columns, constraints, and indexes

use anyhow::{Context, Result};
use tokio_postgres::Client;

/// Column definition as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default: Option<String>,
}

/// Table constraint with its reconstructed SQL definition.
///
/// `contype` carries the pg_constraint type code: `p` (primary key),
/// `u` (unique), `c` (check), `f` (foreign key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDef {
    pub name: String,
    pub contype: String,
    pub definition: String,
}

impl ConstraintDef {
    pub fn is_foreign_key(&self) -> bool {
        self.contype == "f"
    }
}

/// List all table names in the public schema, in catalog order.
pub async fn list_tables(client: &Client) -> Result<Vec<String>> {
    let rows = client
        .query(
            "SELECT tablename
             FROM pg_catalog.pg_tables
             WHERE schemaname = 'public'",
            &[],
        )
        .await
        .context("Failed to query pg_tables for the public schema")?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Sequence definition with optional column ownership.
///
/// Serial columns own their backing sequence; preserving that link in the
/// schema artifact keeps DROP TABLE cascading to the sequence after restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDef {
    pub name: String,
    pub owned_by: Option<(String, String)>,
}

/// List all sequences in the public schema with their owning columns.
pub async fn list_sequences(client: &Client) -> Result<Vec<SequenceDef>> {
    let rows = client
        .query(
            "SELECT s.relname, t.relname, a.attname
             FROM pg_catalog.pg_class s
             JOIN pg_catalog.pg_namespace n ON s.relnamespace = n.oid
             LEFT JOIN pg_catalog.pg_depend d
                ON d.objid = s.oid AND d.deptype = 'a' AND d.classid = 'pg_class'::regclass
             LEFT JOIN pg_catalog.pg_class t ON d.refobjid = t.oid
             LEFT JOIN pg_catalog.pg_attribute a
                ON a.attrelid = t.oid AND a.attnum = d.refobjsubid
             WHERE s.relkind = 'S' AND n.nspname = 'public'
             ORDER BY s.relname",
            &[],
        )
        .await
        .context("Failed to list sequences")?;

    let sequences = rows
        .iter()
        .map(|row| {
            let table: Option<String> = row.get(1);
            let column: Option<String> = row.get(2);
            SequenceDef {
                name: row.get(0),
                owned_by: table.zip(column),
            }
        })
        .collect();

    Ok(sequences)
}

/// Get a table's columns in ordinal order, with types and defaults.
pub async fn table_columns(client: &Client, table: &str) -> Result<Vec<ColumnDef>> {
    let rows = client
        .query(
            "SELECT a.attname,
                    pg_catalog.format_type(a.atttypid, a.atttypmod),
                    a.attnotnull,
                    pg_catalog.pg_get_expr(d.adbin, d.adrelid)
             FROM pg_catalog.pg_attribute a
             JOIN pg_catalog.pg_class c ON a.attrelid = c.oid
             JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
             LEFT JOIN pg_catalog.pg_attrdef d
                ON d.adrelid = a.attrelid AND d.adnum = a.attnum
             WHERE n.nspname = 'public'
               AND c.relname = $1
               AND a.attnum > 0
               AND NOT a.attisdropped
             ORDER BY a.attnum",
            &[&table],
        )
        .await
        .with_context(|| format!("Failed to get columns for table '{}'", table))?;

    let columns = rows
        .iter()
        .map(|row| ColumnDef {
            name: row.get(0),
            data_type: row.get(1),
            not_null: row.get(2),
            default: row.get(3),
        })
        .collect();

    Ok(columns)
}

/// Get a table's constraints with their full SQL definitions.
pub async fn table_constraints(client: &Client, table: &str) -> Result<Vec<ConstraintDef>> {
    let rows = client
        .query(
            "SELECT con.conname,
                    con.contype::text,
                    pg_catalog.pg_get_constraintdef(con.oid, true)
             FROM pg_catalog.pg_constraint con
             JOIN pg_catalog.pg_class c ON con.conrelid = c.oid
             JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
             WHERE n.nspname = 'public' AND c.relname = $1
             ORDER BY con.conname",
            &[&table],
        )
        .await
        .with_context(|| format!("Failed to get constraints for table '{}'", table))?;

    let constraints = rows
        .iter()
        .map(|row| ConstraintDef {
            name: row.get(0),
            contype: row.get(1),
            definition: row.get(2),
        })
        .collect();

    Ok(constraints)
}

/// Get CREATE INDEX statements for a table's standalone indexes.
///
/// Indexes backing primary key or unique constraints are excluded; those are
/// recreated by the constraint definitions themselves.
pub async fn table_indexes(client: &Client, table: &str) -> Result<Vec<String>> {
    let rows = client
        .query(
            "SELECT i.indexdef
             FROM pg_catalog.pg_indexes i
             WHERE i.schemaname = 'public'
               AND i.tablename = $1
               AND NOT EXISTS (
                   SELECT 1
                   FROM pg_catalog.pg_constraint con
                   JOIN pg_catalog.pg_class c ON con.conindid = c.oid
                   WHERE c.relname = i.indexname
               )
             ORDER BY i.indexname",
            &[&table],
        )
        .await
        .with_context(|| format!("Failed to get indexes for table '{}'", table))?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Columns of a table whose defaults draw from a sequence (serial columns).
pub async fn serial_columns(client: &Client, table: &str) -> Result<Vec<String>> {
    let rows = client
        .query(
            "SELECT column_name::text
             FROM information_schema.columns
             WHERE table_schema = 'public'
               AND table_name = $1
               AND column_default LIKE 'nextval%'
             ORDER BY ordinal_position",
            &[&table],
        )
        .await
        .with_context(|| format!("Failed to find serial columns for table '{}'", table))?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_constraints_are_flagged() {
        let fk = ConstraintDef {
            name: "orders_user_id_fkey".to_string(),
            contype: "f".to_string(),
            definition: "FOREIGN KEY (user_id) REFERENCES users(id)".to_string(),
        };
        let pk = ConstraintDef {
            name: "users_pkey".to_string(),
            contype: "p".to_string(),
            definition: "PRIMARY KEY (id)".to_string(),
        };
        assert!(fk.is_foreign_key());
        assert!(!pk.is_foreign_key());
    }

    // NOTE: Query tests require a real PostgreSQL instance, see tests/.
}
