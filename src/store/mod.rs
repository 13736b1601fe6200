mod record;
mod store;

pub use record::{json_type_name, stamp_created, ConstrainedField, Field, Record};
pub use store::{CreateResult, Store, TableLoad};
