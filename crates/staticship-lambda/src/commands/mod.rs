mod invoke;
mod plan;

pub use invoke::{archive_deploy, directory_sync};
pub use plan::plan;
