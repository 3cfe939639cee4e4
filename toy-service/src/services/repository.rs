use crate::models::{DeleteAck, InsertAck, Listing, ListingFilter, UpdateAck};
use crate::services::MongoDb;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::FindOptions,
    Collection,
};
use service_core::error::AppError;

/// Storage seam for listings. Handlers only see this trait.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Listings matching `filter` in store order, at most `limit` when given.
    async fn find_many(
        &self,
        filter: &ListingFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Listing>, AppError>;

    async fn find_one(&self, id: ObjectId) -> Result<Option<Listing>, AppError>;

    async fn insert_one(&self, listing: Listing) -> Result<InsertAck, AppError>;

    /// Shallow merge of `changes` over the stored listing.
    async fn update_one(&self, id: ObjectId, changes: Document) -> Result<UpdateAck, AppError>;

    async fn delete_one(&self, id: ObjectId) -> Result<DeleteAck, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct ListingRepository {
    db: MongoDb,
    listings: Collection<Document>,
}

impl ListingRepository {
    pub fn new(db: &MongoDb) -> Self {
        Self {
            db: db.clone(),
            listings: db.listings(),
        }
    }
}

fn find_options(limit: Option<i64>) -> FindOptions {
    FindOptions::builder().limit(limit).build()
}

/// `$set` update for a shallow merge, or `None` when there is nothing to
/// write: the server rejects an empty `$set`.
fn set_update(changes: Document) -> Option<Document> {
    if changes.is_empty() {
        None
    } else {
        Some(doc! { "$set": changes })
    }
}

#[async_trait]
impl ListingStore for ListingRepository {
    async fn find_many(
        &self,
        filter: &ListingFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Listing>, AppError> {
        let cursor = self
            .listings
            .find(filter.to_document(), find_options(limit))
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Listing::from_document).collect())
    }

    async fn find_one(&self, id: ObjectId) -> Result<Option<Listing>, AppError> {
        let document = self.listings.find_one(doc! { "_id": id }, None).await?;
        Ok(document.map(Listing::from_document))
    }

    async fn insert_one(&self, listing: Listing) -> Result<InsertAck, AppError> {
        let result = self
            .listings
            .insert_one(listing.into_document(), None)
            .await?;
        match result.inserted_id {
            Bson::ObjectId(id) => Ok(InsertAck::new(id)),
            other => Err(AppError::DatabaseError(anyhow::anyhow!(
                "Store returned a non-ObjectId identifier: {}",
                other
            ))),
        }
    }

    async fn update_one(&self, id: ObjectId, changes: Document) -> Result<UpdateAck, AppError> {
        let filter = doc! { "_id": id };

        let Some(update) = set_update(changes) else {
            let matched = self.listings.count_documents(filter, None).await?;
            return Ok(UpdateAck::new(matched, 0));
        };

        let result = self.listings.update_one(filter, update, None).await?;
        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }

    async fn delete_one(&self, id: ObjectId) -> Result<DeleteAck, AppError> {
        let result = self.listings.delete_one(doc! { "_id": id }, None).await?;
        Ok(DeleteAck::new(result.deleted_count))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }
}
