pub mod table_ref;
pub use table_ref::*;

pub mod join_type;
pub use join_type::*;

pub mod field_spec;
pub use field_spec::*;

pub mod field_registry;
pub use field_registry::*;

pub mod query_config;
pub use query_config::*;

pub mod query_defaults;
pub use query_defaults::*;

pub mod query_definition;
pub use query_definition::*;
