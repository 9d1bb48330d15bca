//! Embedded static HTML assets served by the dashboard server.
//!
//! Kept as `&'static str` so they are bundled directly inside the binary
//! without filesystem lookups.

pub mod dashboard;
