use sheetdb_common::LiteralValue;

static EMPTY: LiteralValue = LiteralValue::Empty;

/// Read-only view over a rectangular block of cells.
///
/// Rows may be ragged; the width is the longest row and missing cells read
/// as `Empty`.
pub struct RangeView<'a> {
    backing: RangeBacking<'a>,
    rows: usize,
    cols: usize,
}

enum RangeBacking<'a> {
    /// Borrowed 2D rows without cloning
    Borrowed2D(&'a [Vec<LiteralValue>]),
    /// Rows built for this view (scalar promotion, materialized ranges)
    Owned2D(Vec<Vec<LiteralValue>>),
}

impl<'a> core::fmt::Debug for RangeView<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RangeView")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

fn width(rows: &[Vec<LiteralValue>]) -> usize {
    rows.iter().map(Vec::len).max().unwrap_or(0)
}

impl<'a> RangeView<'a> {
    pub fn from_borrowed(rows: &'a [Vec<LiteralValue>]) -> Self {
        Self {
            backing: RangeBacking::Borrowed2D(rows),
            rows: rows.len(),
            cols: width(rows),
        }
    }

    pub fn from_owned_rows(rows: Vec<Vec<LiteralValue>>) -> Self {
        let (r, c) = (rows.len(), width(&rows));
        Self {
            backing: RangeBacking::Owned2D(rows),
            rows: r,
            cols: c,
        }
    }

    /// Arrays view their rows directly; any other value becomes a 1x1 block.
    pub fn from_literal(value: &'a LiteralValue) -> Self {
        match value {
            LiteralValue::Array(rows) => Self::from_borrowed(rows),
            other => Self::from_owned_rows(vec![vec![other.clone()]]),
        }
    }

    /// Borrow this view without copying owned rows.
    pub fn view(&self) -> RangeView<'_> {
        match &self.backing {
            RangeBacking::Borrowed2D(rows) => RangeView {
                backing: RangeBacking::Borrowed2D(*rows),
                rows: self.rows,
                cols: self.cols,
            },
            RangeBacking::Owned2D(rows) => RangeView {
                backing: RangeBacking::Borrowed2D(rows.as_slice()),
                rows: self.rows,
                cols: self.cols,
            },
        }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn as_1x1(&self) -> Option<LiteralValue> {
        if self.rows == 1 && self.cols == 1 {
            Some(self.cell(0, 0).clone())
        } else {
            None
        }
    }

    fn raw_rows(&self) -> &[Vec<LiteralValue>] {
        match &self.backing {
            RangeBacking::Borrowed2D(rows) => *rows,
            RangeBacking::Owned2D(rows) => rows.as_slice(),
        }
    }

    /// Borrow a cell by row and column index (0-based).
    /// Out-of-bounds and ragged positions read as `Empty`.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &LiteralValue {
        self.raw_rows()
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn get_cell(&self, row: usize, col: usize) -> LiteralValue {
        self.cell(row, col).clone()
    }

    /// Cells of one row, padded to the view width.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &LiteralValue> + '_ {
        (0..self.cols).map(move |c| self.cell(row, c))
    }

    /// Copy the view into rectangular rows.
    pub fn to_rows(&self) -> Vec<Vec<LiteralValue>> {
        (0..self.rows)
            .map(|r| self.row(r).cloned().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_pad_with_empty() {
        let rows = vec![
            vec![LiteralValue::Text("A".into()), LiteralValue::Text("B".into())],
            vec![LiteralValue::Int(1)],
        ];
        let view = RangeView::from_borrowed(&rows);
        assert_eq!(view.dims(), (2, 2));
        assert_eq!(view.get_cell(1, 1), LiteralValue::Empty);
        assert_eq!(view.get_cell(5, 0), LiteralValue::Empty);
        assert_eq!(
            view.to_rows()[1],
            vec![LiteralValue::Int(1), LiteralValue::Empty]
        );
    }

    #[test]
    fn scalars_promote_to_single_cell() {
        let v = LiteralValue::Number(4.0);
        let view = RangeView::from_literal(&v);
        assert_eq!(view.dims(), (1, 1));
        assert_eq!(view.as_1x1(), Some(LiteralValue::Number(4.0)));
        assert_eq!(view.view().dims(), (1, 1));
    }
}
