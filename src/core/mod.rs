// Core modules implementing records, decoding, geometry, and error modeling.
pub mod decode;
pub mod error;
pub mod geo;
pub mod memory;
pub mod record;
pub mod tiles;
