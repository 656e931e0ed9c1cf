//! Purpose: Model a memory upload and its wire encoding.
//! Exports: `MemoryUpload`, `format_timestamp`, `parse_timestamp`, `encode_image`,
//! `upload_outcome`.
//! Role: Request-side counterpart of the memory records the decoder produces.
//! Invariants: Timestamps use `YYYY-MM-DD HH:MM:SS`, the format memories come back in.
//! Invariants: Images arrive already JPEG-encoded; this module only base64-wraps them.

use super::error::{Error, ErrorKind};
use super::geo::Coordinate;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const BASE64_LINE_LEN: usize = 64;
const UPLOAD_SUCCESS_STATUS: &str = "Success!";

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryUpload {
    pub title: String,
    pub desc: String,
    pub timestamp: String,
    pub uploader: String,
    pub location: Coordinate,
    pub image_jpeg: Vec<u8>,
}

#[derive(Serialize)]
pub(crate) struct UploadRequest<'a> {
    title: &'a str,
    desc: &'a str,
    timestamp: &'a str,
    uploader: &'a str,
    location: Coordinate,
    image: String,
}

impl MemoryUpload {
    pub fn new(
        title: impl Into<String>,
        desc: impl Into<String>,
        taken: OffsetDateTime,
        uploader: impl Into<String>,
        location: Coordinate,
        image_jpeg: Vec<u8>,
    ) -> Result<Self, Error> {
        Ok(Self {
            title: title.into(),
            desc: desc.into(),
            timestamp: format_timestamp(taken)?,
            uploader: uploader.into(),
            location,
            image_jpeg,
        })
    }

    pub(crate) fn request_body(&self) -> UploadRequest<'_> {
        UploadRequest {
            title: &self.title,
            desc: &self.desc,
            timestamp: &self.timestamp,
            uploader: &self.uploader,
            location: self.location,
            image: encode_image(&self.image_jpeg),
        }
    }
}

pub fn format_timestamp(datetime: OffsetDateTime) -> Result<String, Error> {
    datetime.format(TIMESTAMP_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to format timestamp")
            .with_source(err)
    })
}

pub fn parse_timestamp(input: &str) -> Result<PrimitiveDateTime, Error> {
    PrimitiveDateTime::parse(input, TIMESTAMP_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid timestamp: {input}"))
            .with_hint("Use the form YYYY-MM-DD HH:MM:SS.")
            .with_source(err)
    })
}

/// Base64 with 64-character lines separated by CRLF.
pub fn encode_image(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    encoded
        .as_bytes()
        .chunks(BASE64_LINE_LEN)
        .map(|line| std::str::from_utf8(line).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Interpret the add-memory response body.
pub fn upload_outcome(value: Option<&Value>) -> Result<(), Error> {
    let Some(value) = value else {
        return Err(Error::new(ErrorKind::Transport).with_message("upload failed: no response"));
    };
    match value.get("status").and_then(Value::as_str) {
        Some(UPLOAD_SUCCESS_STATUS) => Ok(()),
        Some(status) => Err(Error::new(ErrorKind::Rejected)
            .with_message(format!("upload failed: status {status}"))),
        None => Err(Error::new(ErrorKind::Rejected).with_message("upload failed: no status")),
    }
}
