use super::filter::{FilterOptions, select_field_values};
use crate::args::ArgSchema;
use crate::builtins::utils::ARG_DATABASE_TRIPLE;
use crate::coercion::numeric_entry;
use crate::function::Function;
use crate::func_caps;
use crate::range_view::RangeView;
use crate::traits::{CalcValue, FunctionContext};
use sheetdb_common::{ExcelError, ExcelErrorKind, LiteralValue};

/// Aggregation operation type for the summing/counting database functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DAggregate {
    Sum,
    Count,
    CountA,
    Max,
    Min,
    Product,
}

/// Statistical operation type for database variance/stdev functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DStatOp {
    VarSample,   // DVAR - sample variance (n-1 denominator)
    VarPop,      // DVARP - population variance (n denominator)
    StdevSample, // DSTDEV - sample standard deviation (n-1 denominator)
    StdevPop,    // DSTDEVP - population standard deviation (n denominator)
}

const SKIP_BLANKS: FilterOptions = FilterOptions {
    allow_empty_field: false,
    keep_empty: false,
};

const COUNT_ROWS: FilterOptions = FilterOptions {
    allow_empty_field: true,
    keep_empty: true,
};

const KEEP_BLANKS: FilterOptions = FilterOptions {
    allow_empty_field: false,
    keep_empty: true,
};

/// Split the three arguments, failing fast when any of them is an error value.
fn database_args<'v>(
    args: &'v [CalcValue<'_>],
) -> Result<(RangeView<'v>, LiteralValue, RangeView<'v>), ExcelError> {
    if args.len() != 3 {
        return Err(ExcelError::new_value().with_message(format!(
            "D-function expects 3 arguments, got {}",
            args.len()
        )));
    }
    if let Some(e) = args.iter().find_map(CalcValue::as_error) {
        return Err(e.clone());
    }
    Ok((args[0].range_view(), args[1].scalar(), args[2].range_view()))
}

fn field_is_empty(field: &LiteralValue) -> bool {
    matches!(field.coerce_to_single_value(), Ok(LiteralValue::Empty))
}

/// Run the criteria evaluator for one D-function call.
fn select_values(
    name: &'static str,
    args: &[CalcValue<'_>],
    ctx: &dyn FunctionContext,
    opts: FilterOptions,
) -> Result<(Option<Vec<LiteralValue>>, bool), ExcelError> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("database_fn", name).entered();
    let (database, field, criteria) = database_args(args)?;
    let empty_field = field_is_empty(&field);
    let selected = select_field_values(
        &database,
        &field,
        &criteria,
        opts,
        ctx.criteria_matcher(),
    );
    #[cfg(feature = "tracing")]
    if let Err(e) = &selected {
        tracing::debug!(name, error = %e, "database_fn_error");
    }
    #[cfg(not(feature = "tracing"))]
    let _ = name;
    Ok((selected?, empty_field))
}

/// Core evaluation for DSUM, DCOUNT, DCOUNTA, DMAX, DMIN and DPRODUCT.
///
/// A criteria block that matched nothing, or whose matches were all blank,
/// aggregates an empty set.
fn eval_d_function(
    name: &'static str,
    args: &[CalcValue<'_>],
    ctx: &dyn FunctionContext,
    agg: DAggregate,
) -> Result<LiteralValue, ExcelError> {
    let opts = match agg {
        DAggregate::Count | DAggregate::CountA => COUNT_ROWS,
        _ => SKIP_BLANKS,
    };
    let (values, empty_field) = match select_values(name, args, ctx, opts) {
        Ok((Some(values), empty_field)) => (values, empty_field),
        Ok((None, _)) => return Ok(LiteralValue::Number(0.0)),
        Err(e) if e.kind == ExcelErrorKind::Div => return Ok(LiteralValue::Number(0.0)),
        Err(e) => return Err(e),
    };
    let numbers = || values.iter().filter_map(numeric_entry);

    let result = match agg {
        DAggregate::Sum => numbers().sum(),
        DAggregate::Count if empty_field => values.len() as f64,
        DAggregate::Count => numbers().count() as f64,
        DAggregate::CountA => values.iter().filter(|v| !v.is_empty()).count() as f64,
        DAggregate::Max => numbers().reduce(f64::max).unwrap_or(0.0),
        DAggregate::Min => numbers().reduce(f64::min).unwrap_or(0.0),
        // First numeric entry seeds the product, so no numbers yields 0.
        DAggregate::Product => numbers().reduce(|acc, x| acc * x).unwrap_or(0.0),
    };
    Ok(LiteralValue::Number(result))
}

fn eval_daverage(args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
    let Some(values) = select_values("DAVERAGE", args, ctx, SKIP_BLANKS)?.0 else {
        return Err(ExcelError::new_div().with_message("No record matches criteria"));
    };
    let (sum, count) = values
        .iter()
        .filter_map(numeric_entry)
        .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if count == 0 {
        return Err(ExcelError::new_div().with_message("No numeric values to average"));
    }
    Ok(LiteralValue::Number(sum / count as f64))
}

/// Core evaluation function for DGET - returns the single matching value.
fn eval_dget(args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
    let no_match = || ExcelError::new_value().with_message("No record matches criteria");
    let values = match select_values("DGET", args, ctx, SKIP_BLANKS) {
        Ok((Some(values), _)) => values,
        Ok((None, _)) => return Err(no_match()),
        Err(e) if e.kind == ExcelErrorKind::Div => return Err(no_match()),
        Err(e) => return Err(e),
    };
    let mut it = values.into_iter();
    match (it.next(), it.next()) {
        (Some(v), None) => Ok(v),
        (None, _) => Err(no_match()),
        (Some(_), Some(_)) => {
            Err(ExcelError::new_num().with_message("More than one record matches criteria"))
        }
    }
}

/// Core evaluation for DSTDEV, DSTDEVP, DVAR and DVARP.
///
/// Only `Number`-typed matches take part; the first error among the matches
/// is returned as-is. A sample statistic over a single value divides by
/// zero and returns the resulting NaN.
fn eval_d_stat_function(
    name: &'static str,
    args: &[CalcValue<'_>],
    ctx: &dyn FunctionContext,
    stat_op: DStatOp,
) -> Result<LiteralValue, ExcelError> {
    let opts = match stat_op {
        DStatOp::StdevSample => SKIP_BLANKS,
        _ => KEEP_BLANKS,
    };
    let Some(values) = select_values(name, args, ctx, opts)?.0 else {
        return Err(ExcelError::new_div().with_message("No record matches criteria"));
    };

    let mut samples: Vec<f64> = Vec::with_capacity(values.len());
    for v in &values {
        match v {
            LiteralValue::Number(n) => samples.push(*n),
            LiteralValue::Int(i) => samples.push(*i as f64),
            LiteralValue::Error(e) => return Err(e.clone()),
            _ => {}
        }
    }
    if samples.is_empty() {
        return Err(ExcelError::new_div().with_message("No numeric values"));
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let ss = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>();
    let result = match stat_op {
        DStatOp::VarSample => ss / (n - 1.0),
        DStatOp::VarPop => ss / n,
        DStatOp::StdevSample => (ss / (n - 1.0)).sqrt(),
        DStatOp::StdevPop => (ss / n).sqrt(),
    };
    Ok(LiteralValue::Number(result))
}

/* ─────────────────────────── DSUM ──────────────────────────── */
#[derive(Debug)]
pub struct DSumFn;

/// Sums values in a database field for records that match criteria.
///
/// # Remarks
/// - Criteria rows are evaluated with OR semantics; populated criteria cells within one row are ANDed.
/// - `field` resolves by exact header text or 1-based column index; anything else returns `#VALUE!`.
/// - Text entries contribute their leading number (`"12kg"` adds 12); other non-numeric entries are ignored.
/// - No matching record yields 0.
///
/// # Examples
///
/// ```yaml,sandbox
/// title: "Sum heights of apple trees"
/// grid:
///   A1: "Tree"
///   B1: "Height"
///   C1: "Age"
///   A2: "Apple"
///   B2: 18
///   C2: 20
///   A3: "Pear"
///   B3: 12
///   C3: 12
///   E1: "Tree"
///   E2: "Apple"
/// formula: "=DSUM(A1:C3, \"Height\", E1:E2)"
/// expected: 18
/// ```
impl Function for DSumFn {
    func_caps!(PURE, REDUCTION);

    fn name(&self) -> &'static str {
        "DSUM"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_function(self.name(), args, ctx, DAggregate::Sum)
    }
}

/* ───────────────────────── DAVERAGE ────────────────────────── */
#[derive(Debug)]
pub struct DAverageFn;

/// Averages the numeric values of a database field for records that match criteria.
///
/// # Remarks
/// - Returns `#DIV/0!` when no record matches or no matched entry is numeric.
/// - Blank entries are skipped; text contributes its leading number.
///
/// # Examples
///
/// ```yaml,sandbox
/// title: "Average age of trees taller than 10"
/// grid:
///   A1: "Tree"
///   B1: "Height"
///   C1: "Age"
///   A2: "Apple"
///   B2: 18
///   C2: 20
///   A3: "Pear"
///   B3: 12
///   C3: 12
///   E1: "Height"
///   E2: ">10"
/// formula: "=DAVERAGE(A1:C3, 3, E1:E2)"
/// expected: 16
/// ```
impl Function for DAverageFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DAVERAGE"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_daverage(args, ctx)
    }
}

/* ────────────────────────── DCOUNT ─────────────────────────── */
#[derive(Debug)]
pub struct DCountFn;

/// Counts the numeric entries of a database field for records that match criteria.
///
/// # Remarks
/// - With an empty `field`, every matched record is counted whatever it holds.
/// - Booleans and blanks are not numeric; text counts when it starts with a number.
/// - No matching record yields 0.
impl Function for DCountFn {
    func_caps!(PURE, REDUCTION);

    fn name(&self) -> &'static str {
        "DCOUNT"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_function(self.name(), args, ctx, DAggregate::Count)
    }
}

/* ────────────────────────── DCOUNTA ────────────────────────── */
#[derive(Debug)]
pub struct DCountAFn;

/// Counts the non-blank entries of a database field for records that match criteria.
///
/// An empty `field` counts the column named by the first criteria header.
///
/// ```yaml,sandbox
/// title: "Count trees matching either height condition"
/// grid:
///   A1: "Tree"
///   B1: "Height"
///   A2: "Apple"
///   B2: 18
///   A3: "Pear"
///   B3: 12
///   E1: "Height"
///   E2: ">12"
///   E3: "<20"
/// formula: "=DCOUNTA(A1:B3, , E1:E3)"
/// expected: 2
/// ```
impl Function for DCountAFn {
    func_caps!(PURE, REDUCTION);

    fn name(&self) -> &'static str {
        "DCOUNTA"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_function(self.name(), args, ctx, DAggregate::CountA)
    }
}

/* ─────────────────────────── DGET ──────────────────────────── */
#[derive(Debug)]
pub struct DGetFn;

/// Returns the single database entry that matches criteria.
///
/// # Remarks
/// - `#VALUE!` when no record (or only blank entries) match.
/// - `#NUM!` when more than one non-blank entry matches.
/// - The matched entry is returned unchanged, text included.
impl Function for DGetFn {
    func_caps!(PURE, LOOKUP);

    fn name(&self) -> &'static str {
        "DGET"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_dget(args, ctx)
    }
}

/* ─────────────────────────── DMAX ──────────────────────────── */
#[derive(Debug)]
pub struct DMaxFn;

/// Largest numeric entry of a database field for records that match criteria; 0 when there is none.
impl Function for DMaxFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DMAX"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_function(self.name(), args, ctx, DAggregate::Max)
    }
}

/* ─────────────────────────── DMIN ──────────────────────────── */
#[derive(Debug)]
pub struct DMinFn;

/// Smallest numeric entry of a database field for records that match criteria; 0 when there is none.
impl Function for DMinFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DMIN"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_function(self.name(), args, ctx, DAggregate::Min)
    }
}

/* ───────────────────────── DPRODUCT ────────────────────────── */
#[derive(Debug)]
pub struct DProductFn;

/// Multiplies the numeric entries of a database field for records that match criteria.
///
/// # Remarks
/// - The first numeric entry seeds the product, so a selection without numbers yields 0 rather than 1.
impl Function for DProductFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DPRODUCT"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_function(self.name(), args, ctx, DAggregate::Product)
    }
}

/* ────────────────────────── DSTDEV ─────────────────────────── */
#[derive(Debug)]
pub struct DStdevFn;

/// Sample standard deviation of the numeric entries of a database field for records that match criteria.
///
/// # Remarks
/// - Only numeric cells take part; text is ignored even when it looks numeric.
/// - An error among the matched entries is returned as the result.
/// - `#DIV/0!` when nothing matches or no matched entry is numeric.
impl Function for DStdevFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DSTDEV"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_stat_function(self.name(), args, ctx, DStatOp::StdevSample)
    }
}

/* ────────────────────────── DSTDEVP ────────────────────────── */
#[derive(Debug)]
pub struct DStdevPFn;

/// Population standard deviation of the numeric entries of a database field for records that match criteria.
impl Function for DStdevPFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DSTDEVP"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_stat_function(self.name(), args, ctx, DStatOp::StdevPop)
    }
}

/* ─────────────────────────── DVAR ──────────────────────────── */
#[derive(Debug)]
pub struct DVarFn;

/// Sample variance of the numeric entries of a database field for records that match criteria.
///
/// ```yaml,sandbox
/// title: "Variance of apple yields"
/// grid:
///   A1: "Tree"
///   B1: "Yield"
///   A2: "Apple"
///   B2: 10
///   A3: "Apple"
///   B3: 14
///   A4: "Pear"
///   B4: 9
///   D1: "Tree"
///   D2: "Apple"
/// formula: "=DVAR(A1:B4, \"Yield\", D1:D2)"
/// expected: 8
/// ```
impl Function for DVarFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DVAR"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_stat_function(self.name(), args, ctx, DStatOp::VarSample)
    }
}

/* ────────────────────────── DVARP ──────────────────────────── */
#[derive(Debug)]
pub struct DVarPFn;

/// Population variance of the numeric entries of a database field for records that match criteria.
impl Function for DVarPFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "DVARP"
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }

    fn arg_schema(&self) -> &'static [ArgSchema] {
        &ARG_DATABASE_TRIPLE[..]
    }

    fn eval(&self, args: &[CalcValue<'_>], ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        eval_d_stat_function(self.name(), args, ctx, DStatOp::VarPop)
    }
}
