pub mod operator;
pub use operator::*;

pub mod order_spec;
pub use order_spec::*;

pub mod envelope;
pub use envelope::*;
