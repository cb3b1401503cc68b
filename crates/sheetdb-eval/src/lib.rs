//! Spreadsheet database functions and pivot subtotal statistics.
//!
//! The `builtins::database` module implements the twelve Excel D-functions
//! (`DSUM`, `DAVERAGE`, `DCOUNT`, `DCOUNTA`, `DGET`, `DMAX`, `DMIN`,
//! `DPRODUCT`, `DSTDEV`, `DSTDEVP`, `DVAR`, `DVARP`) on top of a header
//! indexer and an OR-of-ANDs criteria evaluator. The `pivot` module holds the
//! mergeable online accumulator a pivot driver uses to compute subtotals.

pub mod args;
pub mod coercion;
pub mod criteria;
pub mod function;
pub mod function_registry;
pub mod range_view;
pub mod traits;

pub mod builtins;
pub mod pivot;
pub mod telemetry;

mod macros;

#[cfg(test)]
mod tests;

pub use criteria::{Condition, CriteriaConfig, CriteriaMatcher, CriteriaOp, ExcelCriteriaMatcher};
pub use function::{FnCaps, Function};
pub use function_registry::{FunctionRegistry, FunctionRegistryBuilder, RegistryError};
pub use range_view::RangeView;
pub use traits::{CalcValue, DefaultFunctionContext, FunctionContext};
