use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{Document, DocumentStore, GroupQuery, StoreError, merge_deep, paths};
use crate::entity::document;
use crate::feed::{ChangeEvent, ChangeFeed, DocumentChange};

/// Document store backed by a single `document` table.
#[derive(Clone)]
pub struct SeaOrmDocumentStore {
    db: DatabaseConnection,
    feed: ChangeFeed,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    /// Read-modify-write one document inside a transaction, then publish the change.
    ///
    /// `apply` receives the current body (if any) and returns the new body, or `None`
    /// to delete the document.
    async fn write<F>(&self, path: &str, apply: F) -> Result<DocumentChange, StoreError>
    where
        F: FnOnce(Option<Map<String, Value>>) -> Result<Option<Map<String, Value>>, StoreError>
            + Send,
    {
        let key = paths::parse(path)?;
        let txn = self.db.begin().await?;

        let existing = document::Entity::find_by_id(path.to_string())
            .lock_exclusive()
            .one(&txn)
            .await?;
        let before = match &existing {
            Some(model) => Some(body(model)?),
            None => None,
        };

        let after = apply(before.clone())?;
        let now = Utc::now();

        match (&existing, &after) {
            (Some(_), Some(data)) => {
                document::ActiveModel {
                    path: Set(path.to_string()),
                    data: Set(Value::Object(data.clone())),
                    update_time: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await?;
            }
            (None, Some(data)) => {
                let model = document::ActiveModel {
                    path: Set(path.to_string()),
                    parent: Set(key.parent.to_string()),
                    collection_id: Set(key.collection_id.to_string()),
                    document_id: Set(key.document_id.to_string()),
                    data: Set(Value::Object(data.clone())),
                    create_time: Set(now),
                    update_time: Set(now),
                };
                document::Entity::insert(model)
                    .exec_without_returning(&txn)
                    .await?;
            }
            (Some(_), None) => {
                document::Entity::delete_by_id(path.to_string())
                    .exec(&txn)
                    .await?;
            }
            (None, None) => {}
        }

        txn.commit().await?;

        let change = DocumentChange {
            path: path.to_string(),
            before,
            after,
        };
        if change.before.is_some() || change.after.is_some() {
            debug!(path, "Document written");
            self.feed.publish(ChangeEvent::Document(change.clone()));
        }
        Ok(change)
    }
}

fn body(model: &document::Model) -> Result<Map<String, Value>, StoreError> {
    match &model.data {
        Value::Object(map) => Ok(map.clone()),
        other => Err(StoreError::Malformed {
            path: model.path.clone(),
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}

fn into_document(model: document::Model) -> Result<Document, StoreError> {
    let data = body(&model)?;
    Ok(Document {
        path: model.path,
        data,
        create_time: model.create_time,
        update_time: model.update_time,
    })
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        paths::parse(path)?;
        document::Entity::find_by_id(path.to_string())
            .one(&self.db)
            .await?
            .map(into_document)
            .transpose()
    }

    #[instrument(skip(self, data))]
    async fn set(&self, path: &str, data: Map<String, Value>) -> Result<(), StoreError> {
        self.write(path, |_| Ok(Some(data))).await?;
        Ok(())
    }

    #[instrument(skip(self, data))]
    async fn merge(&self, path: &str, data: Map<String, Value>) -> Result<(), StoreError> {
        self.write(path, |before| {
            let mut merged = before.unwrap_or_default();
            merge_deep(&mut merged, data);
            Ok(Some(merged))
        })
        .await?;
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        self.write(path, |before| {
            let mut updated = before.ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            updated.extend(fields);
            Ok(Some(updated))
        })
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        let change = self.write(path, |_| Ok(None)).await?;
        Ok(change.before.is_some())
    }

    async fn collection_group(&self, query: &GroupQuery) -> Result<Vec<Document>, StoreError> {
        let mut select = document::Entity::find()
            .filter(document::Column::CollectionId.eq(query.collection_id.as_str()));
        if let Some(id) = &query.document_id {
            select = select.filter(document::Column::DocumentId.eq(id.as_str()));
        }

        let docs = select
            .all(&self.db)
            .await?
            .into_iter()
            .map(into_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(query.apply(docs))
    }

    async fn list_collection(&self, collection_path: &str) -> Result<Vec<Document>, StoreError> {
        document::Entity::find()
            .filter(document::Column::Parent.eq(collection_path))
            .order_by_asc(document::Column::DocumentId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(into_document)
            .collect()
    }
}
