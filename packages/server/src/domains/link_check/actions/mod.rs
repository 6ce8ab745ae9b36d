//! Link check domain actions - business logic functions
//!
//! Actions are async functions called directly from HTTP handlers and the CLI.

mod check_links;

pub use check_links::check_links;
