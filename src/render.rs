//! Purpose: Render CLI output: JSON documents, errors and notices.
//! Exports: `render_json`, `error_json`, `error_text`, `completion_json`, `ColorChoice`.
//! Role: Small, pure formatters used by CLI emission paths.
//! Invariants: When color is disabled, JSON output equals serde_json::to_string_pretty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use campuslore::api::{Completion, Error};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;

const INDENT: &str = "  ";

// 8/16-color palette; bright variants lose contrast on some themes.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_LITERAL: &str = "35";
const COLOR_ERROR: &str = "31";
const COLOR_NOTE: &str = "33";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ColorChoice {
    Plain,
    Ansi,
}

impl ColorChoice {
    pub(crate) fn from_flag(enabled: bool) -> Self {
        if enabled {
            ColorChoice::Ansi
        } else {
            ColorChoice::Plain
        }
    }

    fn paint(self, text: &str, code: &str, out: &mut String) {
        match self {
            ColorChoice::Plain => out.push_str(text),
            ColorChoice::Ansi => {
                out.push_str("\u{1b}[");
                out.push_str(code);
                out.push('m');
                out.push_str(text);
                out.push_str("\u{1b}[0m");
            }
        }
    }

    fn label(self, text: &str, code: &str) -> String {
        let mut out = String::new();
        self.paint(text, code, &mut out);
        out
    }
}

pub(crate) fn render_json(value: &Value, color: ColorChoice) -> String {
    if color == ColorChoice::Plain {
        return serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    }
    let mut out = String::new();
    write_value(value, 0, color, &mut out);
    out
}

fn write_value(value: &Value, depth: usize, color: ColorChoice, out: &mut String) {
    match value {
        Value::Null => color.paint("null", COLOR_LITERAL, out),
        Value::Bool(flag) => color.paint(if *flag { "true" } else { "false" }, COLOR_LITERAL, out),
        Value::Number(number) => color.paint(&number.to_string(), COLOR_NUMBER, out),
        Value::String(text) => color.paint(&quote(text), COLOR_STRING, out),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (idx, item) in items.iter().enumerate() {
                indent(depth + 1, out);
                write_value(item, depth + 1, color, out);
                separator(idx + 1 < items.len(), out);
            }
            indent(depth, out);
            out.push(']');
        }
        Value::Object(map) => {
            out.push_str("{\n");
            for (idx, (key, item)) in map.iter().enumerate() {
                indent(depth + 1, out);
                color.paint(&quote(key), COLOR_KEY, out);
                out.push_str(": ");
                write_value(item, depth + 1, color, out);
                separator(idx + 1 < map.len(), out);
            }
            indent(depth, out);
            out.push('}');
        }
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn separator(more: bool, out: &mut String) {
    if more {
        out.push(',');
    }
    out.push('\n');
}

pub(crate) fn completion_json(feed: &str, completion: &Completion, skipped: usize) -> Value {
    json!({
        "success": completion.success,
        "feed": feed,
        "records": completion.records,
        "skipped": skipped,
    })
}

pub(crate) fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(err.kind().as_str()));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(feed) = err.feed() {
        inner.insert("feed".to_string(), json!(feed));
    }
    if let Some(index) = err.index() {
        inner.insert("index".to_string(), json!(index));
    }
    if let Some(key) = err.key() {
        inner.insert("key".to_string(), json!(key));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

pub(crate) fn error_text(err: &Error, color: ColorChoice) -> String {
    let mut lines = vec![format!(
        "{} {}",
        color.label("error:", COLOR_ERROR),
        error_message(err)
    )];
    if let Some(hint) = err.hint() {
        lines.push(format!("{} {hint}", color.label("hint:", COLOR_NOTE)));
    }
    let location = match (err.feed(), err.index(), err.key()) {
        (Some(feed), Some(index), Some(key)) => Some(format!("{feed}[{index}].{key}")),
        (Some(feed), _, _) => Some(feed.to_string()),
        _ => None,
    };
    if let Some(location) = location {
        lines.push(format!("{} {location}", color.label("at:", COLOR_NOTE)));
    }
    for cause in error_causes(err) {
        lines.push(format!("{} {cause}", color.label("caused by:", COLOR_NOTE)));
    }
    lines.join("\n")
}

pub(crate) fn notice_label(color: ColorChoice) -> String {
    color.label("notice:", COLOR_NOTE)
}

fn error_message(err: &Error) -> String {
    err.message()
        .map(str::to_string)
        .unwrap_or_else(|| err.kind().as_str().to_string())
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

#[cfg(test)]
mod tests {
    use super::{ColorChoice, error_json, error_text, render_json};
    use campuslore::api::{Error, ErrorKind};
    use serde_json::json;

    #[test]
    fn plain_rendering_matches_pretty() {
        let value = json!({
            "records": [{ "name": "Willis Hall", "radius": "45" }],
            "success": true,
            "empty": []
        });
        let plain = render_json(&value, ColorChoice::Plain);
        assert_eq!(plain, serde_json::to_string_pretty(&value).expect("pretty"));
    }

    #[test]
    fn ansi_rendering_strips_back_to_pretty() {
        let value = json!({ "k": "v", "n": 1, "b": true, "z": null, "nested": { "a": [1, 2] } });
        let colored = render_json(&value, ColorChoice::Ansi);
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));

        let mut stripped = String::new();
        let mut chars = colored.chars();
        while let Some(ch) = chars.next() {
            if ch == '\u{1b}' {
                for next in chars.by_ref() {
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                stripped.push(ch);
            }
        }
        assert_eq!(stripped, serde_json::to_string_pretty(&value).expect("pretty"));
    }

    #[test]
    fn error_json_carries_element_location() {
        let err = Error::new(ErrorKind::Malformed)
            .with_message("missing required key")
            .with_feed("geofences")
            .with_index(4)
            .with_key("geofence.radius");
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Malformed");
        assert_eq!(value["error"]["index"], 4);
        assert_eq!(value["error"]["key"], "geofence.radius");
    }

    #[test]
    fn error_text_respects_color_flag() {
        let err = Error::new(ErrorKind::Usage).with_message("bad input");
        let colored = error_text(&err, ColorChoice::Ansi);
        let plain = error_text(&err, ColorChoice::Plain);
        assert!(colored.contains("\u{1b}[31merror:\u{1b}[0m"));
        assert_eq!(plain, "error: bad input");
    }
}
