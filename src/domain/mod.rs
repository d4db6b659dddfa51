//! Domain layer for tablefetch
//!
//! Session, pagination and filter models plus the ports infrastructure
//! adapters implement.

pub mod models;
pub mod ports;
