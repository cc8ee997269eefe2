//! CLI command handlers.

mod download;
mod fetch;
mod size;

pub use download::run_download;
pub use fetch::run_fetch;
pub use size::run_size;
