mod config;
mod storage;

pub use config::Config;
pub use storage::StorageConfig;
