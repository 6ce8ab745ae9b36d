//! Link check domain: pull domains out of text, classify them with the web
//! filters, and present the results.

pub mod actions;
pub mod extract;
pub mod models;
pub mod report;

pub use actions::check_links;
pub use extract::{clean_url, extract_domains};
pub use models::{BatchRequest, DomainResult, Filters};
pub use report::{unblocked_domains, ResultTable};
