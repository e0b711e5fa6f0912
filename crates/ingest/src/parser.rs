use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use uptime_core::normalize_model_name;

/// Cumulative or per-step counters as reported by a `token_count` record.
/// `None` means the counter was absent or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CounterSnapshot {
    pub input_tokens: Option<i64>,
    pub cached_input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub reasoning_output_tokens: Option<i64>,
    pub total_tokens: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TokenCountInfo {
    pub last: Option<CounterSnapshot>,
    pub total: Option<CounterSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EventMessage {
    UserMessage,
    AgentMessage,
    TokenCount(TokenCountInfo),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordKind {
    TurnContext { model: String },
    Event(EventMessage),
    ResponseItem { assistant_message: bool },
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: RecordKind,
}

/// A line that is not a JSON object or whose payload has the wrong shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MalformedLine;

pub(crate) fn parse_json_line(line: &str) -> Option<Value> {
    serde_json::from_str(line).ok()
}

/// Classifies one non-blank line. `Ok(None)` is a well-formed record without
/// a usable timestamp, which is skipped without counting.
pub(crate) fn parse_record(line: &str) -> Result<Option<LogRecord>, MalformedLine> {
    let value = parse_json_line(line).ok_or(MalformedLine)?;
    let obj = value.as_object().ok_or(MalformedLine)?;
    let Some(timestamp) = obj
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
    else {
        return Ok(None);
    };
    let kind = match obj.get("type").and_then(Value::as_str) {
        Some("turn_context") => {
            let payload = payload_object(obj)?;
            RecordKind::TurnContext {
                model: normalize_model_name(payload.and_then(|p| p.get("model")?.as_str())),
            }
        }
        Some("event_msg") => RecordKind::Event(parse_event_message(payload_object(obj)?)?),
        Some("response_item") => {
            let payload = payload_object(obj)?;
            let field = |key: &str| payload.and_then(|p| p.get(key)?.as_str());
            RecordKind::ResponseItem {
                assistant_message: field("type") == Some("message")
                    && field("role") == Some("assistant"),
            }
        }
        _ => RecordKind::Unrecognized,
    };
    Ok(Some(LogRecord { timestamp, kind }))
}

// Missing or null payloads read as empty; any other non-object is malformed.
fn payload_object(obj: &Map<String, Value>) -> Result<Option<&Map<String, Value>>, MalformedLine> {
    optional_object(obj.get("payload"))
}

fn optional_object(value: Option<&Value>) -> Result<Option<&Map<String, Value>>, MalformedLine> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(MalformedLine),
    }
}

fn parse_event_message(
    payload: Option<&Map<String, Value>>,
) -> Result<EventMessage, MalformedLine> {
    let Some(payload) = payload else {
        return Ok(EventMessage::Other);
    };
    let message = match payload.get("type").and_then(Value::as_str) {
        Some("user_message") => EventMessage::UserMessage,
        Some("agent_message") => EventMessage::AgentMessage,
        Some("token_count") => {
            let info = optional_object(payload.get("info"))?;
            let snapshot = |key: &str| {
                info.and_then(|info| info.get(key))
                    .and_then(Value::as_object)
                    .map(parse_snapshot)
            };
            EventMessage::TokenCount(TokenCountInfo {
                last: snapshot("last_token_usage"),
                total: snapshot("total_token_usage"),
            })
        }
        _ => EventMessage::Other,
    };
    Ok(message)
}

fn parse_snapshot(usage: &Map<String, Value>) -> CounterSnapshot {
    let count = |key: &str| usage.get(key).and_then(parse_count);
    CounterSnapshot {
        input_tokens: count("input_tokens"),
        cached_input_tokens: count("cached_input_tokens"),
        output_tokens: count("output_tokens"),
        reasoning_output_tokens: count("reasoning_output_tokens"),
        total_tokens: count("total_tokens"),
    }
}

/// Accepts integers, floats (truncated) and numeric strings. Booleans and
/// anything else are treated as absent.
pub(crate) fn parse_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|value| value.min(i64::MAX as u64) as i64))
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.is_finite())
                    .map(|value| value.trunc() as i64)
            }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// RFC 3339 (including `Z`), or a zone-less ISO timestamp read as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
