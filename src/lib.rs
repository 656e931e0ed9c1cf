//! Purpose: Shared library crate used by the `campuslore` CLI and tests.
//! Exports: `api` (client, decoder, records, errors) and `notice`.
//! Role: Data-access layer for the campus-history backend.
//! Invariants: Decoding is pure; only `api::CampusClient` performs network I/O.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
mod core;
pub mod notice;
