use hostname::get;
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::sync::{Arc, Mutex};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }
}

#[derive(Clone)]
enum Sink {
    Stdio,
    Memory(Arc<Mutex<Vec<String>>>),
}

/// Single-line JSON logger shared by both controllers.
///
/// Cloning is cheap; clones write to the same sink.
#[derive(Clone)]
pub struct Logger {
    service: Arc<str>,
    environment: Arc<str>,
    host: Arc<str>,
    min_level: LogLevel,
    sink: Sink,
}

/// Lines written by a logger built with [`Logger::capture`].
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Event names in emission order.
    pub fn events(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|entry| entry["event"].as_str().map(str::to_string))
            .collect()
    }
}

impl Logger {
    pub fn new(service: &'static str) -> Self {
        let min_level = env::var("LOG_LEVEL")
            .ok()
            .map(|value| LogLevel::from_str(&value))
            .unwrap_or(LogLevel::Info);
        Self::build(service, min_level, Sink::Stdio)
    }

    /// Logger that keeps every line (debug and up) in memory instead of
    /// writing to stdio.
    pub fn capture(service: &'static str) -> (Self, LogCapture) {
        let capture = LogCapture::default();
        let logger = Self::build(
            service,
            LogLevel::Debug,
            Sink::Memory(capture.lines.clone()),
        );
        (logger, capture)
    }

    fn build(service: &'static str, min_level: LogLevel, sink: Sink) -> Self {
        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let host = get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .or_else(|| env::var("HOSTNAME").ok())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            service: Arc::from(service),
            environment: Arc::from(environment),
            host: Arc::from(host),
            min_level,
            sink,
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    fn emit<T: Serialize>(&self, level: LogLevel, event: &str, context: T) {
        if !self.should_log(level) {
            return;
        }

        let timestamp = OffsetDateTime::now_utc();
        let serialized = serde_json::to_value(context).unwrap_or(Value::Null);
        let mut payload = serde_json::Map::new();
        payload.insert(
            "timestamp".into(),
            Value::String(
                timestamp
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| timestamp.to_string()),
            ),
        );
        payload.insert("service".into(), Value::String(self.service.to_string()));
        payload.insert("env".into(), Value::String(self.environment.to_string()));
        payload.insert("host".into(), Value::String(self.host.to_string()));
        payload.insert("level".into(), Value::String(level.as_str().to_string()));
        payload.insert("event".into(), Value::String(event.to_string()));

        match serialized {
            Value::Object(map) => {
                for (key, value) in map {
                    payload.insert(key, value);
                }
            }
            Value::Null => {}
            other => {
                payload.insert("context".into(), other);
            }
        }

        let line = Value::Object(payload).to_string();
        match &self.sink {
            Sink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
            Sink::Stdio => match level {
                LogLevel::Error | LogLevel::Warn => eprintln!("{line}"),
                _ => println!("{line}"),
            },
        }
    }

    pub fn debug<T: Serialize>(&self, event: &str, context: T) {
        self.emit(LogLevel::Debug, event, context);
    }

    pub fn info<T: Serialize>(&self, event: &str, context: T) {
        self.emit(LogLevel::Info, event, context);
    }

    pub fn warn<T: Serialize>(&self, event: &str, context: T) {
        self.emit(LogLevel::Warn, event, context);
    }

    pub fn error<T: Serialize>(&self, event: &str, context: T) {
        self.emit(LogLevel::Error, event, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_levels_leniently() {
        assert_eq!(LogLevel::from_str("WARNING"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str(" debug "), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("verbose"), LogLevel::Info);
    }

    #[test]
    fn capture_flattens_context_into_payload() {
        let (logger, capture) = Logger::capture("portfolio-test");
        logger.info("chat.activated", json!({ "step": "name" }));
        logger.debug("desktop.tick", "raw");

        let entries = capture.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["service"], "portfolio-test");
        assert_eq!(entries[0]["level"], "info");
        assert_eq!(entries[0]["step"], "name");
        assert_eq!(entries[1]["context"], "raw");
        assert_eq!(capture.events(), vec!["chat.activated", "desktop.tick"]);
    }
}
