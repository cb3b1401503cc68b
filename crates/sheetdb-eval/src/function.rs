//! sheetdb-eval/src/function.rs
// Core `Function` trait and its capability flags.

use crate::args::ArgSchema;
use crate::traits::{CalcValue, FunctionContext};
use sheetdb_common::{ExcelError, LiteralValue};
use smallvec::SmallVec;

bitflags::bitflags! {
    /// Describes the capabilities and properties of a function.
    ///
    /// Lets a dispatcher pick evaluation strategies (caching, parallel
    /// fan-out) without knowing the concrete function.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FnCaps: u16 {
        // --- Semantics ---
        /// Same output for the same input, no side effects.
        const PURE          = 0b0000_0000_0001;
        /// Output may change with unchanged inputs (e.g. `RAND()`).
        const VOLATILE      = 0b0000_0000_0010;

        // --- Shape ---
        /// Reduces a range of inputs to a single value (`DSUM`, `DAVERAGE`).
        const REDUCTION     = 0b0000_0000_0100;
        /// Operates element-wise over its inputs.
        const ELEMENTWISE   = 0b0000_0000_1000;
        /// Looks up a single record (`DGET`).
        const LOOKUP        = 0b0000_0010_0000;

        // --- Input Data Types ---
        /// Primarily reads numbers.
        const NUMERIC_ONLY  = 0b0000_0100_0000;
    }
}

/// Object-safe trait implemented by every registered function.
pub trait Function: Send + Sync + 'static {
    /// Capability flags for this function
    fn caps(&self) -> FnCaps {
        FnCaps::PURE
    }

    fn name(&self) -> &'static str;
    fn namespace(&self) -> &'static str {
        ""
    }
    fn min_args(&self) -> usize {
        0
    }
    /// `None` means variadic.
    fn max_args(&self) -> Option<usize> {
        None
    }
    fn variadic(&self) -> bool {
        self.max_args().is_none()
    }
    fn volatile(&self) -> bool {
        self.caps().contains(FnCaps::VOLATILE)
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &[]
    }

    /// Argument positions that may carry 2-D arrays and so need
    /// array-formula fan-out by the caller.
    fn array_arg_indexes(&self) -> SmallVec<[usize; 4]> {
        self.arg_schema()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_array())
            .map(|(i, _)| i)
            .collect()
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext)
    -> Result<LiteralValue, ExcelError>;

    /// Arity-checked entry point. Errors are folded into the returned value.
    fn dispatch(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> LiteralValue {
        let n = args.len();
        if n < self.min_args() || self.max_args().is_some_and(|max| n > max) {
            return LiteralValue::Error(ExcelError::new_value().with_message(format!(
                "{} expects {} arguments, got {n}",
                self.name(),
                match self.max_args() {
                    Some(max) if max == self.min_args() => max.to_string(),
                    Some(max) => format!("{}-{max}", self.min_args()),
                    None => format!("at least {}", self.min_args()),
                }
            )));
        }
        match self.eval(args, ctx) {
            Ok(v) => v,
            Err(e) => LiteralValue::Error(e),
        }
    }
}
