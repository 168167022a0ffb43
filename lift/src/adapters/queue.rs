//! Normalizes SQS batches (`Records[].eventSource == "aws:sqs"`) into
//! `trigger=QUEUE` requests; the whole batch rides along in
//! `metadata.records` (§4.1).

use serde_json::Value;

use lift_core::request::Request;
use lift_core::trigger::Trigger;

use super::metadata_with_records;
use crate::errors::AdapterError;

pub struct QueueAdapter;

fn records(event: &Value) -> Option<&Vec<Value>> {
    event.get("Records").and_then(Value::as_array)
}

impl super::EventAdapter for QueueAdapter {
    fn name(&self) -> &'static str {
        "queue"
    }

    fn can_handle(&self, event: &Value) -> bool {
        records(event)
            .and_then(|r| r.first())
            .and_then(|r| r.get("eventSource"))
            .and_then(Value::as_str)
            == Some("aws:sqs")
    }

    fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        let records = records(event).cloned().unwrap_or_default();
        let queue_arn = records
            .first()
            .and_then(|r| r.get("eventSourceARN"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let mut metadata = metadata_with_records(records);
        metadata.insert("dispatchMethod".to_string(), Value::String("MESSAGE".to_string()));
        metadata.insert("dispatchPath".to_string(), Value::String(queue_arn));

        Ok(Request::new(
            Trigger::Queue,
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
