//! Purpose: Typed content records produced by the decoder and their string-map view.
//! Exports: `Record`, `RecordKind`, per-kind record structs, `GenericRecord`.
//! Role: Shared contract between the decoder and presentation code.
//! Invariants: Required fields are plain fields; only optional fields are `Option`.
//! Invariants: `to_generic` emits required keys always and optional keys only when set.

use super::geo::Coordinate;
use std::collections::BTreeMap;

/// String-keyed view of one record, as handed to UI code.
pub type GenericRecord = BTreeMap<String, String>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordKind {
    Text,
    Image,
    Memory,
    Geofence,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Text => "text",
            RecordKind::Image => "image",
            RecordKind::Memory => "memory",
            RecordKind::Geofence => "geofence",
        }
    }
}

/// Optional display date attached to historical entries.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DisplayDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

impl DisplayDate {
    fn write_into(&self, out: &mut GenericRecord) {
        if let Some(year) = &self.year {
            out.insert("year".to_string(), year.clone());
        }
        if let Some(month) = &self.month {
            out.insert("month".to_string(), month.clone());
        }
        if let Some(day) = &self.day {
            out.insert("day".to_string(), day.clone());
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextRecord {
    pub summary: String,
    pub desc: String,
    pub date: DisplayDate,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageRecord {
    pub desc: String,
    pub caption: String,
    /// Encoded image payload exactly as the backend sent it.
    pub data: String,
    pub date: DisplayDate,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemoryRecord {
    pub data: String,
    pub desc: String,
    pub caption: String,
    pub uploader: String,
    pub taken: String,
    pub posted: String,
    /// Leading token of `taken`; a date such as `2016-05-03`, not a bare year.
    pub year: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Geofence {
    pub name: String,
    pub radius: i64,
    pub center: Coordinate,
}

impl Geofence {
    pub fn contains(&self, point: Coordinate) -> bool {
        self.center.distance_to(&point) <= self.radius as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Text(TextRecord),
    Image(ImageRecord),
    Memory(MemoryRecord),
    Geofence(Geofence),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Text(_) => RecordKind::Text,
            Record::Image(_) => RecordKind::Image,
            Record::Memory(_) => RecordKind::Memory,
            Record::Geofence(_) => RecordKind::Geofence,
        }
    }

    pub fn to_generic(&self) -> GenericRecord {
        let mut out = GenericRecord::new();
        match self {
            Record::Text(text) => {
                insert(&mut out, "type", RecordKind::Text.as_str());
                insert(&mut out, "summary", &text.summary);
                insert(&mut out, "desc", &text.desc);
                text.date.write_into(&mut out);
            }
            Record::Image(image) => {
                insert(&mut out, "type", RecordKind::Image.as_str());
                insert(&mut out, "desc", &image.desc);
                insert(&mut out, "caption", &image.caption);
                insert(&mut out, "data", &image.data);
                image.date.write_into(&mut out);
            }
            Record::Memory(memory) => {
                insert(&mut out, "type", RecordKind::Memory.as_str());
                insert(&mut out, "data", &memory.data);
                insert(&mut out, "desc", &memory.desc);
                insert(&mut out, "caption", &memory.caption);
                insert(&mut out, "uploader", &memory.uploader);
                insert(&mut out, "taken", &memory.taken);
                insert(&mut out, "posted", &memory.posted);
                insert(&mut out, "year", &memory.year);
            }
            Record::Geofence(fence) => {
                insert(&mut out, "name", &fence.name);
                insert(&mut out, "radius", &fence.radius.to_string());
                insert(&mut out, "lat", &fence.center.latitude.to_string());
                insert(&mut out, "lng", &fence.center.longitude.to_string());
            }
        }
        out
    }
}

fn insert(out: &mut GenericRecord, key: &str, value: &str) {
    out.insert(key.to_string(), value.to_string());
}
