//! Object-created notifications.
//!
//! Only the fields needed to locate each object are read; everything else in
//! the notification is ignored.

use oru_ingest::ObjectLocator;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub s3: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    /// Form-URL-encoded key.
    pub key: String,
}

impl StorageEvent {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Decoded locators in notification order.
    pub fn locators(&self) -> Vec<ObjectLocator> {
        self.records
            .iter()
            .map(|record| {
                ObjectLocator::from_event_key(&record.s3.bucket.name, &record.s3.object.key)
            })
            .collect()
    }
}
