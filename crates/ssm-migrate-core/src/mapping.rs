//! Mapping model: the ordered list of parameter → secret pairs driving a run.
//!
//! The mapping document has one recognized top-level field, `secrets`. Each
//! element is either a two-element list or an object:
//!
//! ```yaml
//! secrets:
//!   - ["/app/db/password", "app-db-password"]
//!   - parameter: /app/api/token
//!     secret: app-api-token
//! ```
//!
//! JSON documents are accepted as well.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Top-level field holding the list of entries.
pub const SECRETS_FIELD: &str = "secrets";

/// Object-form field holding the source key.
pub const PARAMETER_FIELD: &str = "parameter";

/// Object-form field holding the destination key.
pub const SECRET_FIELD: &str = "secret";

/// A single source-key → destination-key pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MappingEntry {
    /// Key in the source parameter store.
    pub source_key: String,
    /// Name of the secret in the destination store.
    pub destination_key: String,
}

impl MappingEntry {
    /// Create a new entry.
    pub fn new(source_key: impl Into<String>, destination_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            destination_key: destination_key.into(),
        }
    }
}

/// Non-fatal problems found while loading a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingWarning {
    /// Two rows target the same secret; the later write loses on a first run
    /// and the outcome depends on ordering.
    DuplicateDestination {
        destination_key: String,
        first_row: usize,
        duplicate_row: usize,
    },
    /// The exact same pair appears more than once.
    DuplicateEntry { first_row: usize, duplicate_row: usize },
}

impl std::fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingWarning::DuplicateDestination {
                destination_key,
                first_row,
                duplicate_row,
            } => write!(
                f,
                "destination '{}' is targeted by rows {} and {}",
                destination_key, first_row, duplicate_row
            ),
            MappingWarning::DuplicateEntry {
                first_row,
                duplicate_row,
            } => write!(f, "row {} repeats row {}", duplicate_row, first_row),
        }
    }
}

/// A validated, read-only mapping.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
    warnings: Vec<MappingWarning>,
}

impl Mapping {
    /// Build a mapping from already-constructed entries, validating them.
    pub fn from_entries(entries: Vec<MappingEntry>) -> Result<Self> {
        for (row, entry) in entries.iter().enumerate() {
            check_key(row, "source", &entry.source_key)?;
            check_key(row, "destination", &entry.destination_key)?;
        }
        let warnings = find_duplicates(&entries);
        for warning in &warnings {
            tracing::warn!(%warning, "duplicate mapping row");
        }
        Ok(Self { entries, warnings })
    }

    /// Load a mapping document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mapping = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            entries = mapping.len(),
            warnings = mapping.warnings.len(),
            "mapping loaded"
        );
        Ok(mapping)
    }

    /// Parse a YAML or JSON mapping document.
    pub fn parse(content: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(content)
            .map_err(|e| Error::malformed(format!("invalid document: {}", e)))?;
        Self::from_value(&document)
    }

    /// Build a mapping from a parsed document.
    pub fn from_value(document: &Value) -> Result<Self> {
        let rows = document
            .get(SECRETS_FIELD)
            .ok_or_else(|| Error::malformed(format!("missing `{}` list", SECRETS_FIELD)))?
            .as_sequence()
            .ok_or_else(|| Error::malformed(format!("`{}` must be a list", SECRETS_FIELD)))?;

        let entries = rows
            .iter()
            .enumerate()
            .map(|(row, value)| parse_row(row, value))
            .collect::<Result<Vec<_>>>()?;

        Self::from_entries(entries)
    }

    /// Entries in mapping order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Warnings found while loading.
    pub fn warnings(&self) -> &[MappingWarning] {
        &self.warnings
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_row(row: usize, value: &Value) -> Result<MappingEntry> {
    match value {
        Value::Sequence(pair) => {
            if pair.len() != 2 {
                return Err(Error::malformed_row(
                    row,
                    format!("expected [parameter, secret], got {} element(s)", pair.len()),
                ));
            }
            let source = key_string(row, "source", &pair[0])?;
            let destination = key_string(row, "destination", &pair[1])?;
            Ok(MappingEntry::new(source, destination))
        }
        Value::Mapping(fields) => {
            let source = fields
                .get(PARAMETER_FIELD)
                .ok_or_else(|| Error::malformed_row(row, format!("missing `{}`", PARAMETER_FIELD)))?;
            let destination = fields
                .get(SECRET_FIELD)
                .ok_or_else(|| Error::malformed_row(row, format!("missing `{}`", SECRET_FIELD)))?;
            Ok(MappingEntry::new(
                key_string(row, "source", source)?,
                key_string(row, "destination", destination)?,
            ))
        }
        _ => Err(Error::malformed_row(
            row,
            "expected a [parameter, secret] pair or a {parameter, secret} object",
        )),
    }
}

fn key_string(row: usize, which: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => {
            let key = s.trim();
            check_key(row, which, key)?;
            Ok(key.to_string())
        }
        Value::Null => Err(Error::malformed_row(row, format!("missing {} key", which))),
        _ => Err(Error::malformed_row(row, format!("{} key must be a string", which))),
    }
}

fn check_key(row: usize, which: &str, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::malformed_row(row, format!("empty {} key", which)));
    }
    Ok(())
}

fn find_duplicates(entries: &[MappingEntry]) -> Vec<MappingWarning> {
    let mut seen: HashMap<&str, (usize, &str)> = HashMap::new();
    let mut warnings = Vec::new();

    for (row, entry) in entries.iter().enumerate() {
        match seen.get(entry.destination_key.as_str()) {
            Some(&(first_row, source_key)) if source_key == entry.source_key => {
                warnings.push(MappingWarning::DuplicateEntry {
                    first_row,
                    duplicate_row: row,
                });
            }
            Some(&(first_row, _)) => {
                warnings.push(MappingWarning::DuplicateDestination {
                    destination_key: entry.destination_key.clone(),
                    first_row,
                    duplicate_row: row,
                });
            }
            None => {
                seen.insert(entry.destination_key.as_str(), (row, entry.source_key.as_str()));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_malformed(result: Result<Mapping>, expected_row: Option<usize>) {
        match result {
            Err(Error::MalformedMapping { row, .. }) => assert_eq!(row, expected_row),
            other => panic!("expected MalformedMapping, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_array_rows() {
        let mapping = Mapping::parse(
            r#"
secrets:
  - ["/app/db/password", "app-db-password"]
  - ["/app/api/token", "app-api-token"]
"#,
        )
        .unwrap();

        assert_eq!(
            mapping.entries(),
            &[
                MappingEntry::new("/app/db/password", "app-db-password"),
                MappingEntry::new("/app/api/token", "app-api-token"),
            ]
        );
        assert!(mapping.warnings().is_empty());
    }

    #[test]
    fn test_parse_object_rows() {
        let mapping = Mapping::parse(
            r#"
secrets:
  - parameter: /app/db/password
    secret: app-db-password
"#,
        )
        .unwrap();

        assert_eq!(
            mapping.entries(),
            &[MappingEntry::new("/app/db/password", "app-db-password")]
        );
    }

    #[test]
    fn test_parse_mixed_shapes_preserves_order() {
        let mapping = Mapping::parse(
            r#"
secrets:
  - parameter: /a
    secret: a
  - ["/b", "b"]
  - { parameter: /c, secret: c }
"#,
        )
        .unwrap();

        let sources: Vec<_> = mapping.entries().iter().map(|e| e.source_key.as_str()).collect();
        assert_eq!(sources, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_parse_json_document() {
        let mapping = Mapping::parse(
            r#"{"secrets": [["/app/db/password", "app-db-password"], {"parameter": "/x", "secret": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_keys_are_trimmed() {
        let mapping = Mapping::parse("secrets:\n  - [' /a ', ' a ']\n").unwrap();
        assert_eq!(mapping.entries()[0], MappingEntry::new("/a", "a"));
    }

    #[test]
    fn test_missing_secrets_field() {
        assert_malformed(Mapping::parse("parameters: []\n"), None);
    }

    #[test]
    fn test_secrets_not_a_list() {
        assert_malformed(Mapping::parse("secrets: nope\n"), None);
    }

    #[test]
    fn test_invalid_document() {
        assert_malformed(Mapping::parse("secrets: [unclosed\n"), None);
    }

    #[test]
    fn test_wrong_pair_length() {
        assert_malformed(Mapping::parse("secrets:\n  - ['/a', 'a']\n  - ['/b']\n"), Some(1));
        assert_malformed(Mapping::parse("secrets:\n  - ['/a', 'a', 'extra']\n"), Some(0));
    }

    #[test]
    fn test_missing_object_field() {
        assert_malformed(Mapping::parse("secrets:\n  - parameter: /a\n"), Some(0));
        assert_malformed(Mapping::parse("secrets:\n  - secret: a\n"), Some(0));
    }

    #[test]
    fn test_empty_and_null_keys() {
        assert_malformed(Mapping::parse("secrets:\n  - ['', 'a']\n"), Some(0));
        assert_malformed(Mapping::parse("secrets:\n  - ['/a', '   ']\n"), Some(0));
        assert_malformed(Mapping::parse("secrets:\n  - parameter: /a\n    secret:\n"), Some(0));
    }

    #[test]
    fn test_non_string_key() {
        assert_malformed(Mapping::parse("secrets:\n  - [42, 'a']\n"), Some(0));
    }

    #[test]
    fn test_scalar_row() {
        assert_malformed(Mapping::parse("secrets:\n  - just-a-string\n"), Some(0));
    }

    #[test]
    fn test_from_entries_rejects_empty_key() {
        assert_malformed(
            Mapping::from_entries(vec![MappingEntry::new("/a", "a"), MappingEntry::new("/b", "")]),
            Some(1),
        );
    }

    #[test]
    fn test_duplicate_destination_warns() {
        let mapping = Mapping::parse(
            r#"
secrets:
  - ["/a", "shared"]
  - ["/b", "other"]
  - ["/c", "shared"]
"#,
        )
        .unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.warnings(),
            &[MappingWarning::DuplicateDestination {
                destination_key: "shared".to_string(),
                first_row: 0,
                duplicate_row: 2,
            }]
        );
    }

    #[test]
    fn test_duplicate_entry_warns() {
        let mapping = Mapping::parse("secrets:\n  - ['/a', 'a']\n  - parameter: /a\n    secret: a\n").unwrap();
        assert_eq!(
            mapping.warnings(),
            &[MappingWarning::DuplicateEntry {
                first_row: 0,
                duplicate_row: 1,
            }]
        );
    }

    #[test]
    fn test_empty_list_is_valid() {
        let mapping = Mapping::parse("secrets: []\n").unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.yml");
        std::fs::write(&path, "secrets:\n  - ['/app/db/password', 'app-db-password']\n").unwrap();

        let mapping = Mapping::load(&path).unwrap();
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Mapping::load(dir.path().join("absent.yml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
