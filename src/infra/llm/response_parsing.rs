use serde_json::Value;

const MAX_LOG_SNIPPET_LEN: usize = 256;

/// Keys that may carry text inside an element of an `outputs`/`result` list, in priority order.
const OUTPUT_TEXT_KEYS: &[&str] = &["content", "text", "message"];
const OUTPUT_LIST_KEYS: &[&str] = &["outputs", "result"];

/// A single attempt at reading reply text out of a decoded response body.
type ShapeMatcher = fn(&Value) -> Option<String>;

/// Shapes understood for the local `/api/generate` endpoint. First match wins.
const GENERATE_SHAPES: &[ShapeMatcher] = &[direct_response_text, output_list_text];

/// Shapes understood for chat completions. First match wins.
const CHAT_SHAPES: &[ShapeMatcher] = &[first_choice_message_content, first_choice_plain_text];

pub(crate) fn extract_generate_text(body: &Value) -> Option<String> {
    GENERATE_SHAPES.iter().find_map(|matcher| matcher(body))
}

pub(crate) fn extract_chat_text(body: &Value) -> Option<String> {
    CHAT_SHAPES.iter().find_map(|matcher| matcher(body))
}

pub(crate) fn log_snippet(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_LOG_SNIPPET_LEN).collect()
}

fn direct_response_text(body: &Value) -> Option<String> {
    body.get("response")?.as_str().map(ToOwned::to_owned)
}

fn output_list_text(body: &Value) -> Option<String> {
    let outputs = OUTPUT_LIST_KEYS
        .iter()
        .find_map(|key| body.get(*key).filter(|value| is_truthy(value)))?
        .as_array()?;

    let parts = outputs.iter().filter_map(output_item_text).collect::<Vec<_>>();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn output_item_text(item: &Value) -> Option<&str> {
    match item {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => OUTPUT_TEXT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str)),
        _ => None,
    }
}

fn first_choice(body: &Value) -> Option<&Value> {
    body.get("choices")?.as_array()?.first()
}

fn first_choice_message_content(body: &Value) -> Option<String> {
    let content = first_choice(body)?.get("message")?.get("content")?;
    match content {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Array(parts) => {
            let joined = parts.iter().filter_map(content_part_text).collect::<String>();
            Some(joined.trim().to_string())
        }
        _ => None,
    }
}

fn first_choice_plain_text(body: &Value) -> Option<String> {
    let choice = first_choice(body)?;
    choice
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| choice.get("text").and_then(Value::as_str))
        .map(|text| text.trim().to_string())
}

fn content_part_text(part: &Value) -> Option<&str> {
    match part {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map.get("text").and_then(Value::as_str),
        _ => None,
    }
}

/// Emptiness in the loose sense used by dynamically typed backends.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
