use bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Validation: {0}")]
    Validation(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> DaoResult<Vec<T>> {
        let mut cursor = if let Some(sort) = sort {
            self.collection.find(filter).sort(sort).await?
        } else {
            self.collection.find(filter).await?
        };

        let mut results = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor.try_next().await? {
            results.push(doc);
        }
        Ok(results)
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self.collection.insert_one(doc).await.map_err(|e| {
            if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                ref write_error,
            )) = *e.kind
            {
                if write_error.code == 11000 {
                    return DaoError::DuplicateKey(write_error.message.clone());
                }
            }
            DaoError::Mongo(e)
        })?;

        let id = result
            .inserted_id
            .as_object_id()
            .expect("inserted_id should be ObjectId");
        debug!(?id, "Inserted document");
        Ok(id)
    }

    /// Applies `update` (a `$set`-style document) and stamps `updated_at`.
    pub async fn update_one(&self, filter: Document, update: Document) -> DaoResult<bool> {
        let mut final_update = update;
        if let Ok(set_doc) = final_update.get_document_mut("$set") {
            set_doc.insert("updated_at", bson::DateTime::now());
        } else {
            let fields = std::mem::take(&mut final_update);
            let mut set = fields;
            set.insert("updated_at", bson::DateTime::now());
            final_update = doc! { "$set": set };
        }

        let result = self.collection.update_one(filter, final_update).await?;
        Ok(result.modified_count > 0)
    }

    pub async fn update_by_id(&self, id: ObjectId, update: Document) -> DaoResult<bool> {
        self.update_one(doc! { "_id": id }, update).await
    }

    pub async fn delete_many(&self, filter: Document) -> DaoResult<u64> {
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    pub async fn delete_by_id(&self, id: ObjectId) -> DaoResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }

    pub async fn exists(&self, filter: Document) -> DaoResult<bool> {
        Ok(self.count(filter).await? > 0)
    }

    /// Projects one field's value out of every document matching `filter`.
    /// The record-store "get values of a column" primitive.
    pub async fn find_values(&self, filter: Document, field: &str) -> DaoResult<Vec<Bson>> {
        let raw = self.collection.clone_with_type::<Document>();
        let mut cursor = raw
            .find(filter)
            .projection(doc! { field: 1 })
            .await?;

        let mut values = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor.try_next().await? {
            if let Some(value) = doc.get(field) {
                values.push(value.clone());
            }
        }
        Ok(values)
    }
}
