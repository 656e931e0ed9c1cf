//! Purpose: Define the public Rust API boundary for campuslore.
//! Exports: Client, configuration, decoder, record, geometry and error types.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path to core types.
//! Invariants: Internal modules remain private and are not directly exposed.

mod client;
mod config;

pub use crate::core::decode::{Batch, Completion, DecodeIssue, ErrorPolicy, Feed, decode};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::geo::{Coordinate, EARTH_RADIUS_METERS, distance_meters};
pub use crate::core::memory::{
    MemoryUpload, encode_image, format_timestamp, parse_timestamp, upload_outcome,
};
pub use crate::core::record::{
    DisplayDate, GenericRecord, Geofence, ImageRecord, MemoryRecord, Record, RecordKind,
    TextRecord,
};
pub use crate::core::tiles::{TILE_SIZE, TileLayer};
pub use client::{ApiResult, CampusClient};
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_GEOFENCE_RADIUS, DEFAULT_MEMORY_RADIUS,
    DEFAULT_TIMEOUT_MS, Endpoints,
};
