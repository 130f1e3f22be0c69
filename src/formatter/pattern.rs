//! Placeholder-based formatter.
//!
//! Patterns use `{field}` placeholders; `{{` and `}}` produce literal braces.
//! Unknown placeholders are kept verbatim so a typo shows up in the shipped
//! text instead of silently disappearing.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::EventFormatter;
use crate::log_record::LogEvent;

/// Timestamp layout used for `{asctime}`.
const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Name,
    LevelName,
    Message,
    AscTime,
    Module,
    Filename,
    LineNo,
    ThreadName,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Self::Name,
            "levelname" => Self::LevelName,
            "message" => Self::Message,
            "asctime" => Self::AscTime,
            "module" => Self::Module,
            "filename" => Self::Filename,
            "lineno" => Self::LineNo,
            "threadName" => Self::ThreadName,
            _ => return None,
        })
    }
}

/// Formatter driven by a `{field}` pattern.
///
/// Supported fields: `name`, `levelname`, `message`, `asctime`, `module`,
/// `filename`, `lineno`, `threadName`.
#[derive(Clone, Debug)]
pub struct PatternFormatter {
    segments: Vec<Segment>,
}

impl PatternFormatter {
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: parse_pattern(pattern),
        }
    }

    fn write_field(out: &mut String, field: Field, event: &LogEvent) {
        let metadata = event.metadata();
        match field {
            Field::Name => out.push_str(event.logger()),
            Field::LevelName => out.push_str(event.level_str()),
            Field::Message => out.push_str(event.message()),
            Field::AscTime => {
                let ts: DateTime<Utc> = metadata.timestamp.into();
                let _ = write!(out, "{}", ts.format(ASCTIME_FORMAT));
            }
            Field::Module => out.push_str(&metadata.module_path),
            Field::Filename => out.push_str(&metadata.filename),
            Field::LineNo => {
                let _ = write!(out, "{}", metadata.line_number);
            }
            Field::ThreadName => out.push_str(metadata.thread_name.as_deref().unwrap_or("")),
        }
    }
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                match Field::parse(&name).filter(|_| closed) {
                    Some(field) => {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Field(field));
                    }
                    None => {
                        literal.push('{');
                        literal.push_str(&name);
                        if closed {
                            literal.push('}');
                        }
                    }
                }
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

impl EventFormatter for PatternFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(event.message().len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => Self::write_field(&mut out, *field, event),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::log_record::RecordMetadata;
    use rstest::{fixture, rstest};

    #[fixture]
    fn event() -> LogEvent {
        let metadata = RecordMetadata {
            module_path: "app::net".into(),
            filename: "net.rs".into(),
            line_number: 12,
            ..RecordMetadata::default()
        };
        LogEvent::with_metadata("test", Level::Critical, "Test message", metadata)
    }

    #[rstest]
    fn expands_name_level_and_message(event: LogEvent) {
        let formatter = PatternFormatter::new("Test Formatter - {name} - {levelname} - {message}");
        assert_eq!(
            formatter.format(&event),
            "Test Formatter - test - CRITICAL - Test message"
        );
    }

    #[rstest]
    #[case("{module}:{lineno}", "app::net:12")]
    #[case("{filename}", "net.rs")]
    #[case("{{literal}} {message}", "{literal} Test message")]
    #[case("{unknown} {message}", "{unknown} Test message")]
    #[case("trailing {message", "trailing {message")]
    fn handles_fields_and_escapes(event: LogEvent, #[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(PatternFormatter::new(pattern).format(&event), expected);
    }

    #[rstest]
    fn asctime_uses_millisecond_precision(event: LogEvent) {
        let out = PatternFormatter::new("{asctime}").format(&event);
        // e.g. 2024-05-01 10:11:12,345
        assert_eq!(out.len(), 23);
        assert_eq!(&out[19..20], ",");
    }
}
