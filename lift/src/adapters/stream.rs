//! Normalizes DynamoDB Streams and Kinesis batches
//! (`Records[].eventSource` == `aws:dynamodb` | `aws:kinesis`) into
//! `trigger=STREAM` requests (§4.1).

use serde_json::Value;

use lift_core::request::Request;
use lift_core::trigger::Trigger;

use super::metadata_with_records;
use crate::errors::AdapterError;

pub struct StreamAdapter;

fn records(event: &Value) -> Option<&Vec<Value>> {
    event.get("Records").and_then(Value::as_array)
}

fn event_source(event: &Value) -> Option<&str> {
    records(event)?.first()?.get("eventSource")?.as_str()
}

impl super::EventAdapter for StreamAdapter {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn can_handle(&self, event: &Value) -> bool {
        matches!(event_source(event), Some("aws:dynamodb") | Some("aws:kinesis"))
    }

    fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        let records = records(event).cloned().unwrap_or_default();
        let source = event_source(event).unwrap_or("").to_string();
        let arn = records
            .first()
            .and_then(|r| r.get("eventSourceARN"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let mut metadata = metadata_with_records(records);
        metadata.insert("dispatchMethod".to_string(), Value::String(source));
        metadata.insert("dispatchPath".to_string(), Value::String(arn));

        Ok(Request::new(
            Trigger::Stream,
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
