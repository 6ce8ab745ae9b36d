//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod progress_hub;
pub mod test_dependencies;

pub use deps::{load_category_names, ServerDeps};
pub use progress_hub::{
    BatchProgress, CompletionGuard, ProgressHub, ProgressMessage, ProgressSnapshot, WatchOptions,
    WatchTarget,
};
pub use test_dependencies::{MockCategoryProvider, TestDependencies};
