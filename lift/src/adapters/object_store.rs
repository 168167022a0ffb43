//! Normalizes S3 notification batches (`Records[].eventSource ==
//! "aws:s3"`) into `trigger=OBJECT_STORE` requests (§4.1).

use serde_json::Value;

use lift_core::request::Request;
use lift_core::trigger::Trigger;

use super::metadata_with_records;
use crate::errors::AdapterError;

pub struct ObjectStoreAdapter;

fn records(event: &Value) -> Option<&Vec<Value>> {
    event.get("Records").and_then(Value::as_array)
}

impl super::EventAdapter for ObjectStoreAdapter {
    fn name(&self) -> &'static str {
        "object_store"
    }

    fn can_handle(&self, event: &Value) -> bool {
        records(event)
            .and_then(|r| r.first())
            .and_then(|r| r.get("eventSource"))
            .and_then(Value::as_str)
            == Some("aws:s3")
    }

    fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        let records = records(event).cloned().unwrap_or_default();
        let (event_name, key) = records
            .first()
            .map(|r| {
                let event_name = r.get("eventName").and_then(Value::as_str).unwrap_or("").to_string();
                let key = r
                    .pointer("/s3/object/key")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                (event_name, key)
            })
            .unwrap_or_default();

        let mut metadata = metadata_with_records(records);
        metadata.insert("dispatchMethod".to_string(), Value::String(event_name));
        metadata.insert("dispatchPath".to_string(), Value::String(key));

        Ok(Request::new(
            Trigger::ObjectStore,
            "",
            "",
            http::HeaderMap::new(),
            std::collections::HashMap::new(),
            bytes::Bytes::new(),
            metadata,
            event.clone(),
        ))
    }
}
