//! Database functions (D-functions)
//!
//! Excel D-functions aggregate one field of a database (a range whose first
//! row holds the column headers) over the records selected by a criteria
//! range.
//!
//! Implementations:
//! - DSUM, DAVERAGE, DCOUNT, DCOUNTA, DMAX, DMIN, DPRODUCT
//! - DGET (single-record lookup)
//! - DSTDEV, DSTDEVP, DVAR, DVARP
//!
//! Field argument:
//! - Text matching a column header exactly
//! - Number, numeric text or TRUE/FALSE: 1-based column index
//! - Empty (DCOUNT/DCOUNTA only): the first criteria header's column
//!
//! Criteria structure:
//! - First row contains column headers
//! - Each subsequent row is an OR-branch; populated cells in one row are ANDed
//! - Cells support comparison operators (>, <, >=, <=, <>, =) and wildcards (*, ?)
//! - Text without an operator matches as a prefix ("Ap" selects "Apple")

pub mod columns;
pub mod filter;
mod functions;

pub use columns::{ColumnIndex, IndexMode};
pub use filter::{FilterOptions, RowMask, select_field_values};
pub use functions::*;

use crate::function_registry::{FunctionRegistryBuilder, RegistryError};

pub fn register_builtins(builder: &mut FunctionRegistryBuilder) -> Result<(), RegistryError> {
    crate::register_functions!(
        builder;
        DSumFn,
        DAverageFn,
        DCountFn,
        DCountAFn,
        DGetFn,
        DMaxFn,
        DMinFn,
        DProductFn,
        DStdevFn,
        DStdevPFn,
        DVarFn,
        DVarPFn,
    )
}
