use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use std::fmt::{self as stdfmt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::Event;
use tracing::Subscriber;
use tracing_subscriber::fmt::{
    self as fmt_subscriber, format::Writer, FmtContext, FormatEvent, FormatFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const SERVICE_NAME: &str = "commissioning";

pub fn init_tracing() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(false)
        .with_ansi(false)
        .event_format(KeyValueFormatter::new())
        .fmt_fields(fmt_subscriber::format::DefaultFields::new())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| crate::err!("failed to initialise tracing subscriber: {err}"))
}

/// Writes one `key=value` line per event: timestamp, level, service and channel first,
/// then `event`, then the remaining fields sorted by name.
struct KeyValueFormatter {
    service_name: &'static str,
}

impl KeyValueFormatter {
    const fn new() -> Self {
        Self {
            service_name: SERVICE_NAME,
        }
    }
}

impl<S, N> FormatEvent<S, N> for KeyValueFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let metadata = event.metadata();
        let mut fields = EventFields::default();
        event.record(&mut fields);
        fields.rest.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));

        let mut line = String::new();
        push_field(
            &mut line,
            "ts",
            &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        push_field(&mut line, "level", metadata.level().as_str());
        push_field(&mut line, "service", self.service_name);
        push_field(&mut line, "channel", metadata.target());

        if let Some(span) = ctx.lookup_current() {
            let path: Vec<&str> = span.scope().from_root().map(|s| s.name()).collect();
            push_field(&mut line, "span", &path.join("."));
        }

        if let Some(name) = fields.event.as_deref() {
            push_field(&mut line, "event", name);
        }
        if let Some(message) = fields.message.as_deref() {
            push_field(&mut line, "msg", message);
        }
        for (key, value) in &fields.rest {
            push_field(&mut line, key, value);
        }

        writer.write_str(&line)?;
        writer.write_char('\n')
    }
}

#[derive(Default)]
struct EventFields {
    event: Option<String>,
    message: Option<String>,
    rest: Vec<(String, String)>,
}

impl EventFields {
    fn record_value(&mut self, field: &Field, value: String) {
        match field.name() {
            "" => {}
            "event" => self.event = Some(value),
            "message" => self.message = Some(value),
            name => self.rest.push((name.to_string(), value)),
        }
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }
}

/// Process-wide session counters.
#[derive(Debug, Default)]
pub struct SessionCounters {
    handlers_created: AtomicU64,
    uploads_committed: AtomicU64,
    uploads_skipped: AtomicU64,
    dry_runs: AtomicU64,
    rejections: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCountersSnapshot {
    pub handlers_created: u64,
    pub uploads_committed: u64,
    pub uploads_skipped: u64,
    /// Test-only uploads that prepared batches without writing them.
    pub dry_runs: u64,
    pub rejections: u64,
}

static SESSION_COUNTERS: OnceLock<SessionCounters> = OnceLock::new();

pub fn session_counters() -> &'static SessionCounters {
    SESSION_COUNTERS.get_or_init(SessionCounters::default)
}

impl SessionCounters {
    pub fn inc_handlers_created(&self) {
        self.handlers_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_uploads_committed(&self) {
        self.uploads_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_uploads_skipped(&self) {
        self.uploads_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dry_runs(&self) {
        self.dry_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejections(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SessionCountersSnapshot {
        SessionCountersSnapshot {
            handlers_created: self.handlers_created.load(Ordering::Relaxed),
            uploads_committed: self.uploads_committed.load(Ordering::Relaxed),
            uploads_skipped: self.uploads_skipped.load(Ordering::Relaxed),
            dry_runs: self.dry_runs.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
        }
    }
}

fn encode_field_value(value: &str) -> String {
    let needs_quotes = value.chars().any(|c| {
        c.is_whitespace()
            || matches!(
                c,
                '"' | '\\' | '=' | '[' | ']' | '{' | '}' | ',' | '\n' | '\r' | '\t'
            )
    });

    if !needs_quotes {
        return value.to_string();
    }

    let mut encoded = String::with_capacity(value.len() + 2);
    encoded.push('"');
    for ch in value.chars() {
        match ch {
            '"' => encoded.push_str("\\\""),
            '\\' => encoded.push_str("\\\\"),
            '\n' => encoded.push_str("\\n"),
            '\r' => encoded.push_str("\\r"),
            '\t' => encoded.push_str("\\t"),
            _ => encoded.push(ch),
        }
    }
    encoded.push('"');
    encoded
}

fn push_field(buffer: &mut String, key: &str, value: &str) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(key);
    buffer.push('=');
    buffer.push_str(&encode_field_value(value));
}
