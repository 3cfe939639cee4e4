use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use toy_service::models::{
    DeleteAck, FieldCondition, InsertAck, Listing, ListingFilter, UpdateAck,
};
use toy_service::services::ListingStore;

/// `ListingStore` over a vector, mirroring MongoDB's matching rules for the
/// three filter conditions.
#[derive(Default)]
pub struct InMemoryStore {
    listings: Mutex<Vec<Document>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn with_listings(listings: Vec<Document>) -> Self {
        let store = Self::default();
        {
            let mut stored = store.listings.lock().unwrap();
            for listing in listings {
                stored.push(with_id(listing));
            }
        }
        store
    }

    pub fn snapshot(&self) -> Vec<Document> {
        self.listings.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.snapshot()
            .iter()
            .map(|listing| listing.get_object_id("_id").unwrap())
            .collect()
    }

    /// Makes every subsequent call fail as if the server were unreachable.
    pub fn go_offline(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "server selection timeout"
            )));
        }
        Ok(())
    }
}

fn with_id(listing: Document) -> Document {
    if listing.contains_key("_id") {
        return listing;
    }
    let mut stored = doc! { "_id": ObjectId::new() };
    for (field, value) in listing {
        stored.insert(field, value);
    }
    stored
}

fn lookup<'a>(listing: &'a Document, field: &str) -> Option<&'a Bson> {
    let mut segments = field.split('.');
    let mut current = listing.get(segments.next()?)?;
    for segment in segments {
        current = current.as_document()?.get(segment)?;
    }
    Some(current)
}

fn matches(listing: &Document, filter: &ListingFilter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|(field, condition)| match (condition, lookup(listing, field)) {
            (FieldCondition::Equals(expected), Some(Bson::String(actual))) => actual == expected,
            (FieldCondition::Contains(text), Some(Bson::String(actual))) => {
                actual.to_lowercase().contains(&text.to_lowercase())
            }
            (FieldCondition::Flag(expected), Some(Bson::Boolean(actual))) => actual == expected,
            _ => false,
        })
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn find_many(
        &self,
        filter: &ListingFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Listing>, AppError> {
        self.check_available()?;
        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|listing| matches(listing, filter))
            .take(limit)
            .cloned()
            .map(Listing::from_document)
            .collect())
    }

    async fn find_one(&self, id: ObjectId) -> Result<Option<Listing>, AppError> {
        self.check_available()?;
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .find(|listing| listing.get_object_id("_id").ok() == Some(id))
            .cloned()
            .map(Listing::from_document))
    }

    async fn insert_one(&self, listing: Listing) -> Result<InsertAck, AppError> {
        self.check_available()?;
        let id = ObjectId::new();
        let mut stored = doc! { "_id": id };
        for (field, value) in listing.into_document() {
            stored.insert(field, value);
        }
        self.listings.lock().unwrap().push(stored);
        Ok(InsertAck::new(id))
    }

    async fn update_one(&self, id: ObjectId, changes: Document) -> Result<UpdateAck, AppError> {
        self.check_available()?;
        let mut listings = self.listings.lock().unwrap();
        let Some(listing) = listings
            .iter_mut()
            .find(|listing| listing.get_object_id("_id").ok() == Some(id))
        else {
            return Ok(UpdateAck::new(0, 0));
        };

        let mut modified = false;
        for (field, value) in changes {
            if listing.get(&field) != Some(&value) {
                listing.insert(field, value);
                modified = true;
            }
        }
        Ok(UpdateAck::new(1, u64::from(modified)))
    }

    async fn delete_one(&self, id: ObjectId) -> Result<DeleteAck, AppError> {
        self.check_available()?;
        let mut listings = self.listings.lock().unwrap();
        let before = listings.len();
        listings.retain(|listing| listing.get_object_id("_id").ok() != Some(id));
        Ok(DeleteAck::new((before - listings.len()) as u64))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()
    }
}
