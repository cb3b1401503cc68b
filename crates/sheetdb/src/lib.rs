//! Meta crate that re-exports the sheetdb building blocks. The value types
//! are always available; the evaluator layer sits behind the `eval` feature
//! (on by default).

pub use sheetdb_common as common;
pub use sheetdb_common::{ArgKind, ExcelError, ExcelErrorKind, LiteralValue};

#[cfg(feature = "eval")]
pub use sheetdb_eval as eval;

#[cfg(feature = "eval")]
pub use sheetdb_eval::{
    CalcValue, CriteriaConfig, CriteriaMatcher, DefaultFunctionContext, ExcelCriteriaMatcher,
    FnCaps, Function, FunctionContext, FunctionRegistry, RangeView, RegistryError,
};

#[cfg(feature = "eval")]
pub use sheetdb_eval::pivot::{FinalizedStats, StreamingStats, SubtotalKind};

#[cfg(feature = "eval")]
pub use sheetdb_eval::telemetry::init_tracing;
