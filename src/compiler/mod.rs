pub mod dialect;
pub use dialect::*;

pub mod sql_writer;
pub use sql_writer::*;

pub mod where_node;
pub use where_node::*;

pub mod join_planner;
pub use join_planner::*;

pub mod predicate_compiler;
pub use predicate_compiler::*;

pub mod order_compiler;
pub use order_compiler::*;

pub mod pagination;
pub use pagination::*;

pub mod select_plan;
pub use select_plan::*;

pub mod statement;
pub use statement::*;

pub mod sql_assembler;
pub use sql_assembler::*;
