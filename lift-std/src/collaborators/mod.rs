//! Default implementations of the `lift-core` collaborator contracts.
//!
//! These are reasonable out-of-the-box choices, not the only valid ones:
//! a host is free to supply its own `Logger`/`MetricsCollector`/... built on
//! CloudWatch, Datadog, or anything else, since `lift-core` only depends on
//! the trait, never on these implementations.

mod rate_limit;

pub use rate_limit::InMemoryRateLimitStore;

use lift_core::collaborators::{Logger, Metric, MetricsCollector, SpanGuard, Tracer};
use serde_json::Value;
use tracing::field::Empty;

/// Binds `fields` into every `tracing` event it emits.
pub struct TracingLogger {
    fields: Value,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self {
            fields: Value::Object(Default::default()),
        }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

fn merged(base: &Value, extra: &Value) -> Value {
    let mut merged = base.clone();
    if let (Value::Object(m), Value::Object(e)) = (&mut merged, extra) {
        for (k, v) in e {
            m.insert(k.clone(), v.clone());
        }
    }
    merged
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str, fields: &Value) {
        let all = merged(&self.fields, fields);
        tracing::debug!(fields = %all, "{message}");
    }
    fn info(&self, message: &str, fields: &Value) {
        let all = merged(&self.fields, fields);
        tracing::info!(fields = %all, "{message}");
    }
    fn warn(&self, message: &str, fields: &Value) {
        let all = merged(&self.fields, fields);
        tracing::warn!(fields = %all, "{message}");
    }
    fn error(&self, message: &str, fields: &Value) {
        let all = merged(&self.fields, fields);
        tracing::error!(fields = %all, "{message}");
    }
    fn with(&self, fields: Value) -> Box<dyn Logger> {
        Box::new(TracingLogger {
            fields: merged(&self.fields, &fields),
        })
    }
}

/// A metric that records through a `tracing` event; production hosts swap
/// this for a real metrics collector (CloudWatch EMF, StatsD, ...).
pub struct TracingMetric {
    name: String,
    kind: &'static str,
}

impl Metric for TracingMetric {
    fn record(&self, value: f64, tags: &[(&str, &str)]) {
        let tags: Value = tags
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect::<serde_json::Map<_, _>>()
            .into();
        tracing::info!(
            metric.name = %self.name,
            metric.kind = self.kind,
            metric.value = value,
            metric.tags = %tags,
            "metric"
        );
    }
}

#[derive(Default)]
pub struct TracingMetrics;

impl MetricsCollector for TracingMetrics {
    fn counter(&self, name: &str) -> Box<dyn Metric> {
        Box::new(TracingMetric {
            name: name.to_string(),
            kind: "counter",
        })
    }
    fn gauge(&self, name: &str) -> Box<dyn Metric> {
        Box::new(TracingMetric {
            name: name.to_string(),
            kind: "gauge",
        })
    }
    fn histogram(&self, name: &str) -> Box<dyn Metric> {
        Box::new(TracingMetric {
            name: name.to_string(),
            kind: "histogram",
        })
    }
}

pub struct TracingSpanGuard {
    span: tracing::Span,
    _entered: tracing::span::EnteredSpan,
}

impl SpanGuard for TracingSpanGuard {
    fn add_annotation(&mut self, key: &str, value: &str) {
        self.span.record(key, value);
    }
}

#[derive(Default)]
pub struct StdTracer;

impl Tracer for StdTracer {
    fn start_span(&self, name: &str) -> Box<dyn SpanGuard> {
        let span = tracing::info_span!("lift.span", name = %name, annotation = Empty);
        let entered = span.clone().entered();
        Box::new(TracingSpanGuard {
            span,
            _entered: entered,
        })
    }
}

/// No-op collaborators, useful for unit tests that don't care about
/// observability output.
pub struct NoopLogger;
impl Logger for NoopLogger {
    fn debug(&self, _: &str, _: &Value) {}
    fn info(&self, _: &str, _: &Value) {}
    fn warn(&self, _: &str, _: &Value) {}
    fn error(&self, _: &str, _: &Value) {}
    fn with(&self, _: Value) -> Box<dyn Logger> {
        Box::new(NoopLogger)
    }
}

pub struct NoopMetric;
impl Metric for NoopMetric {
    fn record(&self, _: f64, _: &[(&str, &str)]) {}
}

pub struct NoopMetrics;
impl MetricsCollector for NoopMetrics {
    fn counter(&self, _: &str) -> Box<dyn Metric> {
        Box::new(NoopMetric)
    }
    fn gauge(&self, _: &str) -> Box<dyn Metric> {
        Box::new(NoopMetric)
    }
    fn histogram(&self, _: &str) -> Box<dyn Metric> {
        Box::new(NoopMetric)
    }
}

pub struct NoopSpan;
impl SpanGuard for NoopSpan {
    fn add_annotation(&mut self, _: &str, _: &str) {}
}

pub struct NoopTracer;
impl Tracer for NoopTracer {
    fn start_span(&self, _: &str) -> Box<dyn SpanGuard> {
        Box::new(NoopSpan)
    }
}
