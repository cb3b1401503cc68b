pub mod database;
mod utils;

use crate::function_registry::{FunctionRegistryBuilder, RegistryError};

pub fn register_builtins(builder: &mut FunctionRegistryBuilder) -> Result<(), RegistryError> {
    database::register_builtins(builder)
}
