pub mod conf;
pub mod core;
pub mod store;

#[cfg(feature = "testutil")]
pub mod testutil;
