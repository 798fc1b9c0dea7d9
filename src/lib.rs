//! Beleza Dojo admin, exposed as a library for the integration tests
//! in `tests/`.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod qr;
pub mod report;
pub mod rotation;
pub mod store;
