pub mod truth;
pub use truth::*;

pub mod id_type;
pub use id_type::*;

pub mod id_manager;
pub use id_manager::*;

pub mod table_config;
pub use table_config::*;

pub mod memory_table;
pub use memory_table::*;

pub mod helpers;
pub use helpers::*;

pub mod eval;
pub use eval::*;

pub mod executor;
pub use executor::*;

pub mod memory_db;
pub use memory_db::*;
