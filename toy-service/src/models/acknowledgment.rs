use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub inserted_id: ObjectId,
}

impl InsertAck {
    pub fn new(inserted_id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
    pub upserted_count: u64,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_ack_uses_hex_id() {
        let id = ObjectId::new();
        assert_eq!(
            serde_json::to_value(InsertAck::new(id)).unwrap(),
            json!({ "acknowledged": true, "insertedId": id.to_hex() })
        );
    }

    #[test]
    fn update_ack_shape() {
        assert_eq!(
            serde_json::to_value(UpdateAck::new(1, 0)).unwrap(),
            json!({
                "acknowledged": true,
                "matchedCount": 1,
                "modifiedCount": 0,
                "upsertedId": null,
                "upsertedCount": 0
            })
        );
    }

    #[test]
    fn delete_ack_shape() {
        assert_eq!(
            serde_json::to_value(DeleteAck::new(0)).unwrap(),
            json!({ "acknowledged": true, "deletedCount": 0 })
        );
    }
}
