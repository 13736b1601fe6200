mod args;
mod error;
mod logger;

pub use args::CliArgs;
pub use error::RowfileError;
pub use logger::setup_logging;
