//! Normalizes EventBridge scheduled-rule events
//! (`source == "aws.events"` and `detail-type == "Scheduled Event"`) into
//! `trigger=TIMER` requests. Timer events carry no body; the originating
//! rule ARN rides along in `metadata.schedule` (§4.1).

use std::collections::HashMap;

use serde_json::Value;

use lift_core::request::Request;
use lift_core::trigger::Trigger;

use crate::errors::AdapterError;

pub struct TimerAdapter;

impl super::EventAdapter for TimerAdapter {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn can_handle(&self, event: &Value) -> bool {
        event.get("source").and_then(Value::as_str) == Some("aws.events")
            && event.get("detail-type").and_then(Value::as_str) == Some("Scheduled Event")
    }

    fn adapt(&self, event: &Value) -> Result<Request, AdapterError> {
        let rule_arn = event
            .get("resources")
            .and_then(Value::as_array)
            .and_then(|r| r.first())
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let mut metadata: HashMap<String, Value> = HashMap::new();
        metadata.insert("schedule".to_string(), Value::String(rule_arn.clone()));
        if let Some(time) = event.get("time") {
            metadata.insert("time".to_string(), time.clone());
        }

        Ok(Request::new(
            Trigger::Timer,
            "TICK",
            rule_arn,
            http::HeaderMap::new(),
            HashMap::new(),
            bytes::Bytes::new(),
            metadata,
            event.clone(),
        ))
    }
}
