//! Purpose: Decode backend response values into typed record batches.
//! Exports: `Feed`, `ErrorPolicy`, `Batch`, `DecodeIssue`, `Completion`, `decode`.
//! Role: Pure validation pass between the transport and presentation code.
//! Invariants: An absent value is `Transport`; a missing or empty array is `EmptyResult`.
//! Invariants: Under `Stop`, the first malformed element fails the batch with no records.
//! Invariants: Output preserves source array order; no state survives a call.

use super::error::{Error, ErrorKind};
use super::geo::Coordinate;
use super::record::{
    DisplayDate, GenericRecord, Geofence, ImageRecord, MemoryRecord, Record, TextRecord,
};
use serde_json::{Number, Value};

/// Response shape to decode, naming where the element array lives.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Feed {
    /// `content.<geofence>`: text and image entries for one landmark.
    Historical { geofence: String },
    /// `content`: user-posted memories near a location.
    Memories,
    /// `content`: geofence descriptors near a location.
    Geofences,
}

impl Feed {
    pub fn historical(geofence: impl Into<String>) -> Self {
        Feed::Historical {
            geofence: geofence.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Feed::Historical { .. } => "historical",
            Feed::Memories => "memories",
            Feed::Geofences => "geofences",
        }
    }

    fn elements<'a>(&self, value: &'a Value) -> Option<&'a Vec<Value>> {
        let content = value.get("content")?;
        let array = match self {
            Feed::Historical { geofence } => content.get(geofence.as_str())?,
            Feed::Memories | Feed::Geofences => content,
        };
        array.as_array()
    }

    fn decode_element(&self, element: &Value) -> Result<Record, ElementError> {
        match self {
            Feed::Historical { .. } => historical_element(element),
            Feed::Memories => memory_element(element),
            Feed::Geofences => geofence_element(element),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ErrorPolicy {
    #[default]
    Stop,
    Skip,
}

/// A malformed element dropped under `ErrorPolicy::Skip`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeIssue {
    pub index: usize,
    pub key: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    pub records: Vec<Record>,
    pub skipped: Vec<DecodeIssue>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_generic(&self) -> Vec<GenericRecord> {
        self.records.iter().map(Record::to_generic).collect()
    }

    pub fn into_generic(self) -> Vec<GenericRecord> {
        self.to_generic()
    }
}

/// Success flag plus records; failures always carry an empty list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Completion {
    pub success: bool,
    pub records: Vec<GenericRecord>,
}

impl From<&Result<Batch, Error>> for Completion {
    fn from(result: &Result<Batch, Error>) -> Self {
        match result {
            Ok(batch) => Completion {
                success: true,
                records: batch.to_generic(),
            },
            Err(_) => Completion::default(),
        }
    }
}

#[derive(Debug)]
struct ElementError {
    key: String,
    message: &'static str,
}

impl ElementError {
    fn missing(path: &[&str]) -> Self {
        Self {
            key: path.join("."),
            message: "missing required key",
        }
    }

    fn wrong_type(path: &[&str]) -> Self {
        Self {
            key: path.join("."),
            message: "required key has wrong type",
        }
    }
}

pub fn decode(value: Option<&Value>, feed: &Feed, policy: ErrorPolicy) -> Result<Batch, Error> {
    let Some(value) = value else {
        return Err(Error::new(ErrorKind::Transport)
            .with_message("no response value")
            .with_feed(feed.name()));
    };

    let elements = match feed.elements(value) {
        Some(elements) if !elements.is_empty() => elements,
        _ => {
            return Err(Error::new(ErrorKind::EmptyResult)
                .with_message("no results")
                .with_feed(feed.name()));
        }
    };

    let mut batch = Batch::default();
    for (index, element) in elements.iter().enumerate() {
        match feed.decode_element(element) {
            Ok(record) => batch.records.push(record),
            Err(err) => match policy {
                ErrorPolicy::Stop => return Err(malformed(feed, index, err)),
                ErrorPolicy::Skip => {
                    tracing::debug!(feed = feed.name(), index, key = %err.key, "skipping element");
                    batch.skipped.push(DecodeIssue {
                        index,
                        key: err.key,
                        message: err.message.to_string(),
                    });
                }
            },
        }
    }

    if batch.records.is_empty() {
        let mut err = Error::new(ErrorKind::Malformed)
            .with_message("every element was malformed")
            .with_feed(feed.name());
        if let Some(first) = batch.skipped.first() {
            err = err.with_index(first.index).with_key(first.key.clone());
        }
        return Err(err);
    }

    Ok(batch)
}

fn malformed(feed: &Feed, index: usize, err: ElementError) -> Error {
    Error::new(ErrorKind::Malformed)
        .with_message(err.message)
        .with_feed(feed.name())
        .with_index(index)
        .with_key(err.key)
}

fn historical_element(element: &Value) -> Result<Record, ElementError> {
    let kind = required_str(element, &["type"])?;
    let date = DisplayDate {
        year: optional_display(element, "year"),
        month: optional_display(element, "month"),
        day: optional_display(element, "day"),
    };
    match kind {
        "text" => Ok(Record::Text(TextRecord {
            summary: required_str(element, &["summary"])?.to_string(),
            desc: required_str(element, &["data"])?.to_string(),
            date,
        })),
        "image" => Ok(Record::Image(ImageRecord {
            desc: required_str(element, &["desc"])?.to_string(),
            data: required_str(element, &["data"])?.to_string(),
            caption: required_str(element, &["caption"])?.to_string(),
            date,
        })),
        _ => Err(ElementError {
            key: "type".to_string(),
            message: "unsupported content type",
        }),
    }
}

fn memory_element(element: &Value) -> Result<Record, ElementError> {
    let data = required_str(element, &["image"])?;
    let caption = required_str(element, &["caption"])?;
    let desc = required_str(element, &["desc"])?;
    let uploader = required_str(element, &["uploader"])?;
    let taken = required_str(element, &["timestamps", "taken"])?;
    let posted = required_str(element, &["timestamps", "posted"])?;
    let year = taken
        .split(' ')
        .find(|token| !token.is_empty())
        .ok_or_else(|| ElementError {
            key: "timestamps.taken".to_string(),
            message: "taken timestamp has no date token",
        })?;

    Ok(Record::Memory(MemoryRecord {
        data: data.to_string(),
        desc: desc.to_string(),
        caption: caption.to_string(),
        uploader: uploader.to_string(),
        taken: taken.to_string(),
        posted: posted.to_string(),
        year: year.to_string(),
    }))
}

fn geofence_element(element: &Value) -> Result<Record, ElementError> {
    let name = required_str(element, &["name"])?;
    let radius = required_i64(element, &["geofence", "radius"])?;
    let latitude = required_f64(element, &["geofence", "location", "lat"])?;
    let longitude = required_f64(element, &["geofence", "location", "lng"])?;

    Ok(Record::Geofence(Geofence {
        name: name.to_string(),
        radius,
        center: Coordinate::new(latitude, longitude),
    }))
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, segment| current.get(*segment))
        .filter(|found| !found.is_null())
}

fn required<'a>(element: &'a Value, path: &[&str]) -> Result<&'a Value, ElementError> {
    lookup(element, path).ok_or_else(|| ElementError::missing(path))
}

fn required_str<'a>(element: &'a Value, path: &[&str]) -> Result<&'a str, ElementError> {
    required(element, path)?
        .as_str()
        .ok_or_else(|| ElementError::wrong_type(path))
}

fn required_i64(element: &Value, path: &[&str]) -> Result<i64, ElementError> {
    required(element, path)?
        .as_i64()
        .ok_or_else(|| ElementError::wrong_type(path))
}

fn required_f64(element: &Value, path: &[&str]) -> Result<f64, ElementError> {
    required(element, path)?
        .as_f64()
        .ok_or_else(|| ElementError::wrong_type(path))
}

fn optional_display(element: &Value, key: &str) -> Option<String> {
    match lookup(element, &[key])? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_display(number)),
        _ => None,
    }
}

fn number_display(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    match number.as_f64() {
        // Integral floats print like integers, e.g. 1906.0 -> "1906".
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => format!("{}", float as i64),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Completion, ErrorPolicy, Feed, decode, number_display};
    use crate::core::error::ErrorKind;
    use crate::core::record::Record;
    use serde_json::{Number, json};

    fn memory(taken: &str) -> serde_json::Value {
        json!({
            "image": "base64data",
            "caption": "Reunion",
            "desc": "Class of 1966 on the Bald Spot",
            "uploader": "alum66",
            "timestamps": { "taken": taken, "posted": "2016-06-01 09:00:00" }
        })
    }

    #[test]
    fn absent_value_is_transport_failure() {
        let err = decode(None, &Feed::Memories, ErrorPolicy::Stop).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.feed(), Some("memories"));
    }

    #[test]
    fn missing_empty_or_non_array_content_is_empty_result() {
        let cases = [
            json!({}),
            json!({ "content": [] }),
            json!({ "content": { "other": [] } }),
            json!({ "content": "nope" }),
            json!("not an object"),
        ];
        for value in cases {
            let err = decode(Some(&value), &Feed::Geofences, ErrorPolicy::Stop).expect_err("err");
            assert_eq!(err.kind(), ErrorKind::EmptyResult, "value: {value}");
        }
    }

    #[test]
    fn historical_mixes_text_and_image_in_order() {
        let value = json!({
            "content": {
                "Willis Hall": [
                    { "type": "text", "summary": "Oldest building", "data": "Built 1872", "year": 1872 },
                    { "type": "image", "desc": "South face", "data": "AAAA", "caption": "c. 1900", "month": "May" }
                ]
            }
        });
        let batch = decode(
            Some(&value),
            &Feed::historical("Willis Hall"),
            ErrorPolicy::Stop,
        )
        .expect("batch");
        assert_eq!(batch.len(), 2);
        let generic = batch.to_generic();
        assert_eq!(generic[0]["type"], "text");
        assert_eq!(generic[0]["desc"], "Built 1872");
        assert_eq!(generic[0]["year"], "1872");
        assert!(!generic[0].contains_key("month"));
        assert_eq!(generic[1]["type"], "image");
        assert_eq!(generic[1]["month"], "May");
        assert!(!generic[1].contains_key("year"));
    }

    #[test]
    fn historical_unknown_type_is_malformed() {
        let value = json!({ "content": { "Sayles": [ { "type": "video", "data": "x" } ] } });
        let err = decode(Some(&value), &Feed::historical("Sayles"), ErrorPolicy::Stop)
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.key(), Some("type"));
    }

    #[test]
    fn historical_text_requires_summary() {
        let value = json!({ "content": { "Sayles": [ { "type": "text", "data": "x" } ] } });
        let err = decode(Some(&value), &Feed::historical("Sayles"), ErrorPolicy::Stop)
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.key(), Some("summary"));
        assert_eq!(err.index(), Some(0));
    }

    #[test]
    fn memory_year_is_leading_date_token() {
        let value = json!({ "content": [memory("2016-05-03 14:22:00")] });
        let batch = decode(Some(&value), &Feed::Memories, ErrorPolicy::Stop).expect("batch");
        let Record::Memory(record) = &batch.records[0] else {
            panic!("expected memory record");
        };
        assert_eq!(record.year, "2016-05-03");
        assert_eq!(batch.to_generic()[0]["type"], "memory");
    }

    #[test]
    fn memory_year_skips_leading_spaces() {
        let value = json!({ "content": [memory("  1999-12-31 23:59:59")] });
        let batch = decode(Some(&value), &Feed::Memories, ErrorPolicy::Stop).expect("batch");
        assert_eq!(batch.to_generic()[0]["year"], "1999-12-31");
    }

    #[test]
    fn memory_blank_taken_timestamp_is_malformed() {
        let value = json!({ "content": [memory("   ")] });
        let err = decode(Some(&value), &Feed::Memories, ErrorPolicy::Stop).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.key(), Some("timestamps.taken"));
    }

    #[test]
    fn geofence_radius_must_be_integer() {
        let value = json!({
            "content": [
                { "name": "Goodsell", "geofence": { "radius": 50.5, "location": { "lat": 44.0, "lng": -93.0 } } }
            ]
        });
        let err = decode(Some(&value), &Feed::Geofences, ErrorPolicy::Stop).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.key(), Some("geofence.radius"));
    }

    #[test]
    fn geofence_accepts_integer_coordinates() {
        let value = json!({
            "content": [
                { "name": "Origin", "geofence": { "radius": 10, "location": { "lat": 44, "lng": -93 } } }
            ]
        });
        let batch = decode(Some(&value), &Feed::Geofences, ErrorPolicy::Stop).expect("batch");
        let Record::Geofence(fence) = &batch.records[0] else {
            panic!("expected geofence");
        };
        assert_eq!(fence.center.latitude, 44.0);
        assert_eq!(fence.center.longitude, -93.0);
    }

    #[test]
    fn null_required_key_counts_as_missing() {
        let mut element = memory("2016-05-03 14:22:00");
        element["uploader"] = serde_json::Value::Null;
        let value = json!({ "content": [element] });
        let err = decode(Some(&value), &Feed::Memories, ErrorPolicy::Stop).expect_err("err");
        assert_eq!(err.message(), Some("missing required key"));
        assert_eq!(err.key(), Some("uploader"));
    }

    #[test]
    fn skip_policy_keeps_good_elements() {
        let mut bad = memory("2016-05-03 14:22:00");
        bad.as_object_mut().unwrap().remove("caption");
        let value = json!({ "content": [memory("2001-01-01 00:00:00"), bad, memory("2002-02-02 00:00:00")] });
        let batch = decode(Some(&value), &Feed::Memories, ErrorPolicy::Skip).expect("batch");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].index, 1);
        assert_eq!(batch.skipped[0].key, "caption");
        let years: Vec<String> = batch
            .to_generic()
            .into_iter()
            .map(|record| record["year"].clone())
            .collect();
        assert_eq!(years, vec!["2001-01-01", "2002-02-02"]);
    }

    #[test]
    fn skip_policy_with_nothing_decodable_is_malformed() {
        let value = json!({ "content": [ { "name": 3 } ] });
        let err = decode(Some(&value), &Feed::Geofences, ErrorPolicy::Skip).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.index(), Some(0));
        assert_eq!(err.key(), Some("name"));
    }

    #[test]
    fn completion_flattens_failures_to_empty() {
        let value = json!({ "content": [] });
        let result = decode(Some(&value), &Feed::Memories, ErrorPolicy::Stop);
        let completion = Completion::from(&result);
        assert!(!completion.success);
        assert!(completion.records.is_empty());
    }

    #[test]
    fn completion_carries_generic_records_on_success() {
        let value = json!({ "content": [memory("2016-05-03 14:22:00")] });
        let result = decode(Some(&value), &Feed::Memories, ErrorPolicy::Stop);
        let completion = Completion::from(&result);
        assert!(completion.success);
        assert_eq!(completion.records, result.expect("batch").into_generic());
    }

    #[test]
    fn number_display_renders_integral_floats_without_fraction() {
        assert_eq!(number_display(&Number::from(1906)), "1906");
        assert_eq!(
            number_display(&Number::from_f64(1906.0).expect("finite")),
            "1906"
        );
        assert_eq!(
            number_display(&Number::from_f64(1906.5).expect("finite")),
            "1906.5"
        );
    }
}
