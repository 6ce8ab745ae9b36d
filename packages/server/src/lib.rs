// Link Filter Checker - API Core
//
// Extracts domains from free-form text and checks each one against the
// Lightspeed and FortiGuard web filters, streaming batch progress over SSE.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
