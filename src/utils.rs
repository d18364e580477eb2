// ABOUTME: Utility functions for identifier validation and quoting
// ABOUTME: Guards table names before they are interpolated into COPY statements

use anyhow::{bail, Result};

/// Quote an identifier for interpolation into SQL.
///
/// Doubles embedded quote characters per SQL quoting rules. Validated names
/// never contain quotes, so this is belt-and-suspenders for display paths.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Schema-qualify and quote a table name in the public schema.
pub fn quote_table(table: &str) -> String {
    format!("\"public\".{}", quote_ident(table))
}

/// Validate a table name against PostgreSQL identifier rules.
///
/// Identifiers must be 1-63 characters, start with a letter or underscore,
/// and contain only letters, digits, and underscores. Names from the catalog
/// and names derived from artifact files both pass through here before any
/// use in SQL, so quotes, spaces, and SQL metacharacters are rejected rather
/// than interpolated.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Table name cannot be empty");
    }

    if name.len() > 63 {
        bail!(
            "Table name '{}' exceeds maximum length of 63 characters (got {})",
            sanitize_for_display(name),
            name.len()
        );
    }

    let first = name.chars().next().unwrap();
    if !first.is_ascii_alphabetic() && first != '_' {
        bail!(
            "Table name '{}' must start with a letter or underscore",
            sanitize_for_display(name)
        );
    }

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            bail!(
                "Table name '{}' contains invalid character '{}'. \
                 Only letters, digits, and underscores are allowed",
                sanitize_for_display(name),
                if c.is_control() {
                    format!("\\x{:02x}", c as u32)
                } else {
                    c.to_string()
                }
            );
        }
    }

    Ok(())
}

/// Strip control characters and cap length so untrusted names are safe to log.
fn sanitize_for_display(name: &str) -> String {
    name.chars().filter(|c| !c.is_control()).take(100).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_ident_wraps_and_escapes() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn quote_table_is_schema_qualified() {
        assert_eq!(quote_table("orders"), "\"public\".\"orders\"");
    }

    #[test]
    fn valid_table_names_pass() {
        assert!(validate_table_name("users").is_ok());
        assert!(validate_table_name("_staging").is_ok());
        assert!(validate_table_name("order_items_2024").is_ok());
    }

    #[test]
    fn invalid_table_names_are_rejected() {
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2fast").is_err());
        assert!(validate_table_name("my-table").is_err());
        assert!(validate_table_name("users; DROP TABLE users").is_err());
        assert!(validate_table_name("na\"me").is_err());
        assert!(validate_table_name("with space").is_err());
        assert!(validate_table_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn display_sanitization_strips_control_chars() {
        let err = validate_table_name("bad\nname").unwrap_err().to_string();
        assert!(err.contains("badname"));
        assert!(!err.contains('\n'));
    }
}
