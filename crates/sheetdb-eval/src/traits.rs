//! sheetdb-eval – argument and context traits handed to every function.

use crate::criteria::{CriteriaConfig, CriteriaMatcher, ExcelCriteriaMatcher};
use crate::range_view::RangeView;
use sheetdb_common::{ExcelError, LiteralValue};

/* ───────────────────────────── CalcValue ───────────────────────────── */

/// An evaluated argument: either a scalar or a (possibly borrowed) range.
#[derive(Debug)]
pub enum CalcValue<'a> {
    Scalar(LiteralValue),
    Range(RangeView<'a>),
}

impl<'a> CalcValue<'a> {
    /// The argument itself is an error value (not a range containing one).
    pub fn as_error(&self) -> Option<&ExcelError> {
        match self {
            CalcValue::Scalar(v) => v.as_error(),
            CalcValue::Range(_) => None,
        }
    }

    /// View the argument as a block of cells. Scalars become 1x1 blocks.
    pub fn range_view(&self) -> RangeView<'_> {
        match self {
            CalcValue::Scalar(v) => RangeView::from_literal(v),
            CalcValue::Range(r) => r.view(),
        }
    }

    /// Scalar reading of the argument. A 1x1 range yields its cell, larger
    /// ranges come back as an `Array`.
    pub fn scalar(&self) -> LiteralValue {
        match self {
            CalcValue::Scalar(v) => v.clone(),
            CalcValue::Range(r) => r
                .as_1x1()
                .unwrap_or_else(|| LiteralValue::Array(r.to_rows())),
        }
    }
}

impl From<LiteralValue> for CalcValue<'_> {
    fn from(v: LiteralValue) -> Self {
        CalcValue::Scalar(v)
    }
}

impl<'a> From<RangeView<'a>> for CalcValue<'a> {
    fn from(r: RangeView<'a>) -> Self {
        CalcValue::Range(r)
    }
}

/* ─────────────────────────── FunctionContext ─────────────────────────── */

/// Host services available to a function while it evaluates.
pub trait FunctionContext {
    fn criteria_matcher(&self) -> &dyn CriteriaMatcher;
}

/// Stock context backed by [`ExcelCriteriaMatcher`].
#[derive(Clone, Debug, Default)]
pub struct DefaultFunctionContext {
    matcher: ExcelCriteriaMatcher,
}

impl DefaultFunctionContext {
    pub fn new(config: CriteriaConfig) -> Self {
        Self {
            matcher: ExcelCriteriaMatcher::new(config),
        }
    }
}

impl FunctionContext for DefaultFunctionContext {
    fn criteria_matcher(&self) -> &dyn CriteriaMatcher {
        &self.matcher
    }
}
