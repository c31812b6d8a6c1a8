//! Idempotent document upserts on top of the SQLite store.
//!
//! A document is a flat JSON object. Records are matched on a caller-given
//! list of fields; both the JSON path and the value of every filter term are
//! bound parameters, and composite values are stringified before they can
//! reach a filter or the stored body.

use crate::db::pool::DocumentStore;
use crate::errors::{AppError, AppResult};
use chrono::Local;
use rusqlite::{OptionalExtension, Transaction, params, params_from_iter};
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

/// Non-empty ordered list of field names identifying one logical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKeys(Vec<String>);

impl UniqueKeys {
    pub fn new<I, S>(keys: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(AppError::InvalidKeySpec(
                "unique_keys must contain at least one field name".into(),
            ));
        }
        for key in &keys {
            validate_key(key)?;
        }
        Ok(Self(keys))
    }

    /// Copy of these keys with `key` appended (if not already present).
    pub fn with(&self, key: &str) -> AppResult<Self> {
        validate_key(key)?;
        let mut keys = self.0.clone();
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
        Ok(Self(keys))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Keys coming from untyped input (config, JSON payloads) must be a list of strings.
impl TryFrom<&Value> for UniqueKeys {
    type Error = AppError;

    fn try_from(value: &Value) -> AppResult<Self> {
        let Value::Array(items) = value else {
            return Err(AppError::InvalidKeySpec(format!(
                "unique_keys must be a list of field names, got {value}"
            )));
        };

        let mut keys = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => keys.push(s.clone()),
                other => {
                    return Err(AppError::InvalidKeySpec(format!(
                        "unique_keys entry {i} is not a string: {other}"
                    )));
                }
            }
        }
        Self::new(keys)
    }
}

fn validate_key(key: &str) -> AppResult<()> {
    if key.is_empty() {
        return Err(AppError::InvalidKeySpec("empty field name".into()));
    }
    if key.contains('"') {
        return Err(AppError::InvalidKeySpec(format!(
            "field name must not contain quotes: {key}"
        )));
    }
    Ok(())
}

/// Outcome counters of one [`DocumentStore::upsert`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpsertStats {
    pub inserted: usize,
    pub replaced: usize,
    /// Documents with none of the key fields present.
    pub skipped: usize,
}

impl UpsertStats {
    pub fn written(&self) -> usize {
        self.inserted + self.replaced
    }
}

/// Scalars pass through; arrays and objects become their JSON text.
pub fn sanitize_document(doc: &Document) -> Document {
    doc.iter()
        .map(|(k, v)| {
            let clean = match v {
                Value::Array(_) | Value::Object(_) => Value::String(v.to_string()),
                scalar => scalar.clone(),
            };
            (k.clone(), clean)
        })
        .collect()
}

/// JSON path of the source-file field; indexed by `idx_documents_source`.
const SOURCE_FILE_PATH: &str = "$.\"_source_file\"";

/// `(json path, json-encoded value)` pairs for the keys present in `doc`.
fn build_filter(doc: &Document, keys: &UniqueKeys) -> Vec<(String, String)> {
    keys.as_slice()
        .iter()
        .filter_map(|key| match doc.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some((format!("$.\"{key}\""), value.to_string())),
        })
        .collect()
}

fn find_matching_id(
    tx: &Transaction<'_>,
    collection: &str,
    filter: &[(String, String)],
) -> AppResult<Option<i64>> {
    // Only placeholders and the constant source path are interpolated;
    // caller-provided paths and all values are bound.
    let mut sql = String::from("SELECT id FROM documents WHERE collection = ?");
    let mut args: Vec<&str> = vec![collection];
    for (path, value) in filter {
        if path == SOURCE_FILE_PATH {
            sql.push_str(&format!(
                " AND json_extract(body, '{SOURCE_FILE_PATH}') = json_extract(?, '$')"
            ));
        } else {
            sql.push_str(" AND json_extract(body, ?) = json_extract(?, '$')");
            args.push(path.as_str());
        }
        args.push(value.as_str());
    }
    sql.push_str(" ORDER BY id ASC LIMIT 1");

    let mut stmt = tx.prepare_cached(&sql)?;
    let id = stmt
        .query_row(params_from_iter(args), |row| row.get::<_, i64>(0))
        .optional()?;
    Ok(id)
}

impl DocumentStore {
    /// Replace-or-insert every document, matching on `keys`.
    ///
    /// Keys missing (or null) in a document are left out of its filter; a
    /// document whose filter would be empty is skipped rather than matched
    /// against the whole collection.
    pub fn upsert(
        &mut self,
        collection: &str,
        documents: &[Document],
        keys: &UniqueKeys,
    ) -> AppResult<UpsertStats> {
        let tx = self.conn.transaction()?;
        let mut stats = UpsertStats::default();
        let now = Local::now().to_rfc3339();

        for doc in documents {
            let doc = sanitize_document(doc);
            let filter = build_filter(&doc, keys);
            if filter.is_empty() {
                stats.skipped += 1;
                continue;
            }

            let body = serde_json::to_string(&doc)?;
            match find_matching_id(&tx, collection, &filter)? {
                Some(id) => {
                    tx.execute(
                        "UPDATE documents SET body = ?1, updated_at = ?2 WHERE id = ?3",
                        params![body, now, id],
                    )?;
                    stats.replaced += 1;
                }
                None => {
                    tx.execute(
                        "INSERT INTO documents (collection, body, updated_at) VALUES (?1, ?2, ?3)",
                        params![collection, body, now],
                    )?;
                    stats.inserted += 1;
                }
            }
        }

        tx.commit()?;
        Ok(stats)
    }

    /// Every document of `collection`, in insertion order.
    pub fn find_all(&self, collection: &str) -> AppResult<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT body FROM documents WHERE collection = ?1 ORDER BY id ASC")?;
        let rows = stmt.query_map([collection], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for r in rows {
            match serde_json::from_str::<Value>(&r?)? {
                Value::Object(map) => out.push(map),
                other => {
                    return Err(AppError::Other(format!(
                        "non-object document in '{collection}': {other}"
                    )));
                }
            }
        }
        Ok(out)
    }

    pub fn count(&self, collection: &str) -> AppResult<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}
