//! Credential list loading
//!
//! Parses the uploaded CSV into [`CredentialRow`] records. The header must
//! name the `output_name`, `login` and `password` columns; any other column is
//! ignored.

use crate::error::CredPdfError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Columns every credential CSV must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["login", "output_name", "password"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One line of the credential CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRow {
    pub output_name: String,
    pub login: String,
    pub password: String,
}

impl CredentialRow {
    pub fn new(
        output_name: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            output_name: output_name.into(),
            login: login.into(),
            password: password.into(),
        }
    }

    /// True when either credential field is blank.
    pub fn has_empty_credentials(&self) -> bool {
        self.login.is_empty() || self.password.is_empty()
    }
}

/// Parse and validate credential rows from raw CSV bytes.
///
/// Fields are trimmed. Data rows are numbered from 2 in error messages, the
/// header being line 1. Empty `login`/`password` values are only accepted
/// when `allow_empty_credentials` is set. Each `output_name` may appear once,
/// so a clash is reported before any PDF is built.
pub fn load_rows(
    bytes: &[u8],
    allow_empty_credentials: bool,
) -> Result<Vec<CredentialRow>, CredPdfError> {
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let (output_col, login_col, password_col) =
        match (column("output_name"), column("login"), column("password")) {
            (Some(o), Some(l), Some(p)) => (o, l, p),
            _ => {
                return Err(CredPdfError::Schema {
                    required: REQUIRED_COLUMNS.join(", "),
                    found: headers,
                })
            }
        };

    let mut rows = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = idx + 2;
        let field = |col: usize| record.get(col).unwrap_or("").trim().to_string();

        let row = CredentialRow {
            output_name: field(output_col),
            login: field(login_col),
            password: field(password_col),
        };

        if row.output_name.is_empty() {
            return Err(CredPdfError::Validation {
                line,
                reason: "output_name is empty".into(),
            });
        }
        if !allow_empty_credentials && row.has_empty_credentials() {
            return Err(CredPdfError::Validation {
                line,
                reason: "login/password is empty".into(),
            });
        }
        if let Some(first) = first_seen.insert(row.output_name.clone(), line) {
            return Err(CredPdfError::Validation {
                line,
                reason: format!(
                    "output_name '{}' already used on line {}",
                    row.output_name, first
                ),
            });
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(CredPdfError::EmptyInput);
    }

    tracing::debug!("Loaded {} credential rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_rows_basic() {
        let csv = b"output_name,login,password\nalice,alice1,p@ss1\nbob,bob1,p@ss2\n";
        let rows = load_rows(csv, false).unwrap();
        assert_eq!(
            rows,
            vec![
                CredentialRow::new("alice", "alice1", "p@ss1"),
                CredentialRow::new("bob", "bob1", "p@ss2"),
            ]
        );
    }

    #[test]
    fn test_load_rows_strips_bom_and_whitespace() {
        let csv = "\u{FEFF}output_name,login,password\n  alice , alice1 ,\tp@ss1 \n";
        let rows = load_rows(csv.as_bytes(), false).unwrap();
        assert_eq!(rows, vec![CredentialRow::new("alice", "alice1", "p@ss1")]);
    }

    #[test]
    fn test_load_rows_ignores_extra_columns_and_order() {
        let csv = b"password,notes,output_name,login\nsecret,hello,carol,carol1\n";
        let rows = load_rows(csv, false).unwrap();
        assert_eq!(rows, vec![CredentialRow::new("carol", "carol1", "secret")]);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = b"output_name,login\nalice,alice1\n";
        let err = load_rows(csv, false).unwrap_err();
        match err {
            CredPdfError::Schema { required, found } => {
                assert_eq!(required, "login, output_name, password");
                assert_eq!(found, vec!["output_name".to_string(), "login".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_output_name_names_the_line() {
        let csv = b"output_name,login,password\nalice,a,b\n ,c,d\n";
        let err = load_rows(csv, false).unwrap_err();
        assert!(matches!(err, CredPdfError::Validation { line: 3, .. }));
        assert!(err.to_string().starts_with("Line 3:"));
    }

    #[test]
    fn test_empty_credentials_rejected_unless_allowed() {
        let csv = b"output_name,login,password\nalice,,\n";
        let err = load_rows(csv, false).unwrap_err();
        assert!(matches!(err, CredPdfError::Validation { line: 2, .. }));

        let rows = load_rows(csv, true).unwrap();
        assert_eq!(rows, vec![CredentialRow::new("alice", "", "")]);
    }

    #[test]
    fn test_duplicate_output_name_names_the_second_line() {
        let csv = b"output_name,login,password\nalice,a1,p1\nbob,b1,p2\n alice ,a2,p3\n";
        let err = load_rows(csv, false).unwrap_err();
        assert!(matches!(err, CredPdfError::Validation { line: 4, .. }));
        assert_eq!(
            err.to_string(),
            "Line 4: output_name 'alice' already used on line 2"
        );

        // Copies without new credentials still need distinct names
        let csv = b"output_name,login,password\nalice,,\nalice,,\n";
        assert!(matches!(
            load_rows(csv, true).unwrap_err(),
            CredPdfError::Validation { line: 3, .. }
        ));
    }

    #[test]
    fn test_short_rows_yield_empty_fields() {
        let csv = b"output_name,login,password\nalice\n";
        let rows = load_rows(csv, true).unwrap();
        assert_eq!(rows[0].login, "");
        assert!(load_rows(csv, false).is_err());
    }

    #[test]
    fn test_header_only_is_empty_input() {
        let csv = b"output_name,login,password\n";
        assert!(matches!(
            load_rows(csv, false).unwrap_err(),
            CredPdfError::EmptyInput
        ));
    }

    #[test]
    fn test_quoted_fields() {
        let csv = b"output_name,login,password\n\"doe, jane\",\"j(d)\",\"a\"\"b\"\n";
        let rows = load_rows(csv, false).unwrap();
        assert_eq!(rows, vec![CredentialRow::new("doe, jane", "j(d)", "a\"b")]);
    }
}
