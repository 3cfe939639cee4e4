use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use service_core::error::AppError;

pub const ID_FIELD: &str = "_id";

/// A toy listing as stored: an arbitrary document plus its store-assigned `_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing(Document);

impl Listing {
    pub fn from_document(document: Document) -> Self {
        Self(document)
    }

    /// Builds a new listing from a request body. Any client-supplied `_id` is
    /// dropped so that the store assigns the identifier.
    pub fn from_json(body: Map<String, Value>) -> Result<Self, AppError> {
        Ok(Self(document_from_json(body)?))
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.0.get_object_id(ID_FIELD).ok()
    }

    pub fn document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    /// JSON rendering used on the wire: ObjectIds as hex strings, datetimes as
    /// RFC 3339, everything else as relaxed extended JSON.
    pub fn to_json(&self) -> Value {
        document_to_json(&self.0)
    }
}

impl Serialize for Listing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Parses a path identifier. Malformed ids are a client error.
pub fn parse_listing_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Invalid listing id '{}': {}", raw, e))
    })
}

/// Converts a partial update body into the fields to `$set`. `_id` is immutable
/// and never part of the change set.
pub fn changes_from_json(body: Map<String, Value>) -> Result<Document, AppError> {
    document_from_json(body)
}

fn document_from_json(mut body: Map<String, Value>) -> Result<Document, AppError> {
    body.remove(ID_FIELD);
    mongodb::bson::to_document(&body).map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Listing body cannot be stored: {}", e))
    })
}

fn document_to_json(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), bson_to_json(value)))
            .collect(),
    )
}

fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| value.clone().into_relaxed_extjson()),
        Bson::Document(document) => document_to_json(document),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}
