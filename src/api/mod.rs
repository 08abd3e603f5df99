//! API module
//!
//! Thin HTTP surface over the transaction service. Presentation concerns
//! (auth, documentation, rendering) live outside this crate.

pub mod routes;

pub use routes::create_router;
