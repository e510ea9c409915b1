pub mod driver;
pub use driver::*;

pub mod memory;
pub use memory::*;
