// HTTP routes
pub mod check_links;
pub mod extract;
pub mod health;
pub mod progress;

pub use check_links::*;
pub use extract::*;
pub use health::*;
pub use progress::*;
