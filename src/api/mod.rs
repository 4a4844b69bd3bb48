// HTTP API for the project feed.
// Serves the feed plus cache maintenance endpoints over axum.

pub mod routes;
pub mod server;

pub use server::{router, serve, start};
