pub mod error;
pub mod function;
pub mod value;

pub use error::*;
pub use function::*;
pub use value::*;
