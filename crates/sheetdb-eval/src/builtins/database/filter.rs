//! Criteria evaluation: resolve the field, select matching rows, project.

use super::columns::{ColumnIndex, IndexMode};
use crate::coercion::{criteria_text, parse_numeric_text};
use crate::criteria::{Condition, CriteriaMatcher};
use crate::range_view::RangeView;
use sheetdb_common::{ExcelError, LiteralValue};

/// Per-function switches for [`select_field_values`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// An empty field selector defers to the first criteria header instead
    /// of failing with `#VALUE!`.
    pub allow_empty_field: bool,
    /// Keep blank cells in the projection.
    pub keep_empty: bool,
}

/// Boolean selection over the data rows of a database block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowMask(Vec<bool>);

impl RowMask {
    pub fn all(rows: usize) -> Self {
        RowMask(vec![true; rows])
    }

    pub fn none(rows: usize) -> Self {
        RowMask(vec![false; rows])
    }

    pub fn from_fn(rows: usize, f: impl FnMut(usize) -> bool) -> Self {
        RowMask((0..rows).map(f).collect())
    }

    pub fn and(&mut self, other: &RowMask) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a &= *b;
        }
    }

    pub fn or(&mut self, other: &RowMask) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a |= *b;
        }
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A criteria cell parsed once and tested against a whole column.
enum PreparedCondition {
    /// Blank criteria cells match everything.
    Always,
    /// Error criteria cells match nothing.
    Never,
    Test(Condition),
}

impl PreparedCondition {
    fn new(matcher: &dyn CriteriaMatcher, cell: &LiteralValue) -> Self {
        if cell.is_error() {
            return PreparedCondition::Never;
        }
        let text = criteria_text(cell);
        if text.is_empty() {
            return PreparedCondition::Always;
        }
        let cond = matcher.parse(&text);
        PreparedCondition::Test(if matcher.implicit_prefix_match() {
            cond.with_prefix_wildcard()
        } else {
            cond
        })
    }

    fn matches(&self, matcher: &dyn CriteriaMatcher, value: &LiteralValue) -> bool {
        match self {
            PreparedCondition::Always => true,
            PreparedCondition::Never => false,
            PreparedCondition::Test(cond) => matcher.test(value, cond),
        }
    }
}

/// Field selector after the checks that run before any row is tested.
enum FieldRef<'i> {
    /// An ordinal that named a registered data header.
    Header(&'i str),
    /// A header name, looked up only once rows have matched.
    Name(String),
    /// Empty field: the first criteria header picks the column.
    FirstCriteria,
}

/// Classify the field selector. Ordinals are checked here; names are not,
/// so a criteria block that matches nothing still reports "no match".
///
/// Numbers, numeric text and booleans are ordinals (`TRUE` is column 1).
fn resolve_field<'i>(
    field: &LiteralValue,
    data: &'i ColumnIndex,
    opts: FilterOptions,
) -> Result<FieldRef<'i>, ExcelError> {
    let field = field
        .coerce_to_single_value()
        .map_err(|_| ExcelError::new_value().with_message("Field must be a single cell"))?;
    let ordinal = match &field {
        LiteralValue::Error(e) => return Err(e.clone()),
        LiteralValue::Empty if opts.allow_empty_field => return Ok(FieldRef::FirstCriteria),
        LiteralValue::Empty => {
            return Err(ExcelError::new_value().with_message("Field is empty"));
        }
        LiteralValue::Number(n) => *n,
        LiteralValue::Int(i) => *i as f64,
        LiteralValue::Boolean(b) => f64::from(u8::from(*b)),
        LiteralValue::Text(s) => match parse_numeric_text(s) {
            Some(n) => n,
            None => return Ok(FieldRef::Name(s.clone())),
        },
        other => return Ok(FieldRef::Name(criteria_text(other).into_owned())),
    };
    (ordinal.fract() == 0.0 && ordinal >= 1.0)
        .then(|| data.header_at(ordinal as usize - 1))
        .flatten()
        .map(FieldRef::Header)
        .ok_or_else(|| {
            ExcelError::new_value().with_message(format!(
                "Field index {ordinal} does not name a column (1-{})",
                data.width()
            ))
        })
}

/// Select the values of the chosen field for every database row matching
/// the criteria block.
///
/// Each criteria row below the header is an OR-branch; within a branch every
/// non-blank cell whose header names a data column is ANDed. Criteria headers
/// that name no data column are ignored, and a block where no header names a
/// data column selects every row.
///
/// Returns:
/// - `Ok(Some(values))`: the projected values, in row order.
/// - `Ok(None)`: the criteria applied but no row matched. This wins over an
///   unknown field name.
/// - `Err(#DIV/0!)`: rows matched but nothing survived projection.
/// - `Err(#VALUE!)`: an empty field where none is allowed, an ordinal
///   outside the header row, or a field name (or, for an empty field, first
///   criteria header) that names no data column.
pub fn select_field_values(
    database: &RangeView<'_>,
    field: &LiteralValue,
    criteria: &RangeView<'_>,
    opts: FilterOptions,
    matcher: &dyn CriteriaMatcher,
) -> Result<Option<Vec<LiteralValue>>, ExcelError> {
    let data = ColumnIndex::build(database, IndexMode::Data);
    let crit = ColumnIndex::build(criteria, IndexMode::Criteria);
    let rows = data.data_rows();

    let field_header = resolve_field(field, &data, opts)?;

    let mut saw_any_header = false;
    let mut selection = RowMask::none(rows);
    for r in 1..=crit.data_rows() {
        let mut branch: Option<RowMask> = None;
        for j in 0..crit.width() {
            let Some(series) = crit.header_at(j).and_then(|h| data.column(h)) else {
                continue;
            };
            saw_any_header = true;
            let condition = PreparedCondition::new(matcher, criteria.cell(r, j));
            let mask = RowMask::from_fn(rows, |n| condition.matches(matcher, &series[n]));
            match branch.as_mut() {
                Some(b) => b.and(&mask),
                None => branch = Some(mask),
            }
        }
        selection.or(&branch.unwrap_or_else(|| RowMask::all(rows)));
    }
    if !saw_any_header {
        selection = RowMask::all(rows);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        rows,
        criteria_rows = crit.data_rows(),
        saw_any_header,
        selected = selection.count(),
        "database_selection"
    );

    if saw_any_header && selection.count() == 0 {
        return Ok(None);
    }

    let output_header = match &field_header {
        FieldRef::Header(h) => *h,
        FieldRef::Name(name) => name.as_str(),
        FieldRef::FirstCriteria => crit.header_at(0).ok_or_else(|| {
            ExcelError::new_value().with_message("Empty field and no criteria header")
        })?,
    };
    let column = data.column(output_header).ok_or_else(|| {
        ExcelError::new_value()
            .with_message(format!("Field '{output_header}' not found in database headers"))
    })?;

    let values: Vec<LiteralValue> = selection
        .selected()
        .map(|n| &column[n])
        .filter(|v| opts.keep_empty || !v.is_empty())
        .cloned()
        .collect();

    if values.is_empty() {
        return Err(ExcelError::new_div().with_message("No values survived the criteria"));
    }
    Ok(Some(values))
}
