//! Document database: JSON documents addressed by slash-separated paths.

mod error;
mod relational;

pub mod paths;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

pub use error::StoreError;
pub use relational::SeaOrmDocumentStore;

/// Field every user-facing document carries with its last write time.
pub const LAST_COMMITTED: &str = "_last_committed";

/// A stored document.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub path: String,
    pub data: Map<String, Value>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Document {
    /// Last path segment.
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Deserialize the body into a typed record.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.data.clone())).map_err(|e| StoreError::Malformed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// Bulk read across every collection with the same id, wherever it is nested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupQuery {
    pub collection_id: String,
    /// Only documents with this id.
    pub document_id: Option<String>,
    /// Sort ascending by this top-level field; documents without it are excluded.
    pub order_by: Option<String>,
}

impl GroupQuery {
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            document_id: None,
            order_by: None,
        }
    }

    pub fn document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Filter and sort documents fetched for this query.
    pub fn apply(&self, mut docs: Vec<Document>) -> Vec<Document> {
        if let Some(field) = &self.order_by {
            docs.retain(|d| d.data.contains_key(field));
            docs.sort_by(|a, b| {
                compare_values(&a.data[field], &b.data[field]).then_with(|| a.path.cmp(&b.path))
            });
        } else {
            docs.sort_by(|a, b| a.path.cmp(&b.path));
        }
        docs
    }
}

/// Document database operations the handlers and triggers depend on.
///
/// Every mutation publishes a [`crate::feed::DocumentChange`] once committed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite a document.
    async fn set(&self, path: &str, data: Map<String, Value>) -> Result<(), StoreError>;

    /// Create a document, or deep-merge `data` into an existing one.
    async fn merge(&self, path: &str, data: Map<String, Value>) -> Result<(), StoreError>;

    /// Replace top-level fields of an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] when the document does not exist.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Returns `true` if the document existed.
    async fn delete(&self, path: &str) -> Result<bool, StoreError>;

    async fn collection_group(&self, query: &GroupQuery) -> Result<Vec<Document>, StoreError>;

    /// Documents directly inside `collection_path`, ordered by id.
    async fn list_collection(&self, collection_path: &str) -> Result<Vec<Document>, StoreError>;
}

/// Current time as stored in documents (RFC 3339, UTC).
pub fn server_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Serialize a record into a document body.
pub fn to_document<T: Serialize>(value: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Malformed {
            path: String::new(),
            message: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(StoreError::Malformed {
            path: String::new(),
            message: e.to_string(),
        }),
    }
}

/// Recursively merge `patch` into `target`; nested objects merge, everything else replaces.
pub fn merge_deep(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match value {
            Value::Object(incoming) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => merge_deep(existing, incoming),
                _ => {
                    target.insert(key, Value::Object(incoming));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare_values(x, y))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => rank(a).cmp(&rank(b)),
    }
}
