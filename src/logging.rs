//! Helper macro enforcing consistent log fields for the commissioning client.
//!
//! Every diagnostic carries an `event` field and is emitted on one of the two logical
//! channels below, so log consumers can filter on `target` without parsing messages.

/// Channel for session lifecycle and upload diagnostics.
pub const DB_CLIENT: &str = "db-client";

/// Channel for configuration-database connection diagnostics.
pub const CABLING: &str = "cabling";

/// Log an event on a channel for a run type plus any extra fields.
#[macro_export]
macro_rules! client_event {
    ($level:ident, $target:expr, $event:expr, run_type = $run_type:expr $(, $field:ident = $value:expr )* $(,)?) => {
        tracing::$level!(
            target: $target,
            event = $event,
            run_type = %$run_type,
            $($field = %$value,)*
        )
    };
    ($level:ident, $target:expr, $event:expr $(, $field:ident = $value:expr )* $(,)?) => {
        tracing::$level!(
            target: $target,
            event = $event,
            $($field = %$value,)*
        )
    };
}
