//! Debug logging handed explicitly to each stage.
//!
//! Library code never touches a global logger: every stage takes a
//! `&dyn Diagnostics`. Use [`NoopDiagnostics`] when nobody is listening, and
//! [`TracingDiagnostics`] to forward into `tracing` (the binary does this).
use std::fmt;

/// Key/value pairs attached to one event.
pub type Fields<'a> = [(&'a str, &'a dyn fmt::Debug)];

pub trait Diagnostics: Send + Sync {
    fn debug(&self, message: &str, fields: &Fields<'_>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn debug(&self, _message: &str, _fields: &Fields<'_>) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, message: &str, fields: &Fields<'_>) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        tracing::debug!(fields = %render_fields(fields), "{message}");
    }
}

pub fn render_fields(fields: &Fields<'_>) -> String {
    let mut s = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(&format!("{key}={value:?}"));
    }
    s
}

/// Keeps every event; handy in tests.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: std::sync::Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn events(&self) -> Vec<String> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn debug(&self, message: &str, fields: &Fields<'_>) {
        let line = if fields.is_empty() {
            message.to_string()
        } else {
            format!("{message} {}", render_fields(fields))
        };
        match self.events.lock() {
            Ok(mut events) => events.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_message_and_fields() {
        let log = RecordingDiagnostics::default();
        log.debug("checking field", &[("record", &"Gte"), ("field", &"Two")]);
        log.debug("done", &[]);
        assert_eq!(
            log.events(),
            vec![
                r#"checking field record="Gte" field="Two""#.to_string(),
                "done".to_string(),
            ]
        );
    }

    #[test]
    fn noop_accepts_anything() {
        NoopDiagnostics.debug("ignored", &[("n", &1)]);
    }
}
