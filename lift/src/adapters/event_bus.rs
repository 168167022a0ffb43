//! Normalizes generic EventBridge events (carrying `detail-type`/`source`
//! but not matching the Timer scheduled-event shape) into `trigger=EVENT_BUS`
//! requests; the single event rides along in `metadata.records` as a
//! one-element batch for symmetry with the other batched triggers (§4.1).

use std::collections::HashMap;

use serde_json::Value;

use lift_core::request::Request;
use lift_core::trigger::Trigger;

use super::metadata_with_records;
use crate::errors::AdapterError;

pub struct EventBusAdapter;

impl super::EventAdapter for EventBusAdapter {
    fn name(&self) -> &'static str {
        "event_bus"
    }

    fn can_handle(&self, event: &Value) -> bool {
        let has_shape =
            event.get("detail-type").and_then(Value::as_str).is_some() && event.get("source").and_then(Value::as_str).is_some();
        if !has_shape {
            return false;
        }
        // The Timer adapter claims the scheduled-rule shape first when
        // registered ahead of this one; guard here too so this adapter
        // stays correct used standalone.
        !(event.get("source").and_then(Value::as_str) == Some("aws.events")
            && event.get("detail-type").and_then(Value::as_str) == Some("Scheduled Event"))
    }

    fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        let detail_type = event.get("detail-type").and_then(Value::as_str).unwrap_or("").to_string();
        let source = event.get("source").and_then(Value::as_str).unwrap_or("").to_string();

        let mut metadata: HashMap<String, Value> = metadata_with_records(vec![event.clone()]);
        metadata.insert("detail-type".to_string(), Value::String(detail_type.clone()));
        metadata.insert("dispatchMethod".to_string(), Value::String(detail_type));
        metadata.insert("dispatchPath".to_string(), Value::String(source));

        Ok(Request::new(
            Trigger::EventBus,
            "",
            "",
            http::HeaderMap::new(),
            HashMap::new(),
            bytes::Bytes::new(),
            metadata,
            event.clone(),
        ))
    }
}
