//! Header-driven column index over a database or criteria block.

use crate::coercion::criteria_text;
use crate::range_view::RangeView;
use rustc_hash::FxHashMap;
use sheetdb_common::LiteralValue;

/// Which block is being indexed; duplicate headers are treated differently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndexMode {
    /// Database block: a repeated header only backfills blanks of the first
    /// same-named column.
    Data,
    /// Criteria block: a repeated header keeps its position and shares the
    /// first column's value bucket.
    Criteria,
}

/// Ordered headers plus a header → values map for one block.
///
/// Header keys are the exact text of the header cell (numbers and booleans
/// stringified). Row 0 of the block is the header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    /// One slot per column. In `Data` mode a repeated header leaves `None`.
    headers: Vec<Option<String>>,
    columns: FxHashMap<String, Vec<LiteralValue>>,
    rows: usize,
}

impl ColumnIndex {
    pub fn build(view: &RangeView<'_>, mode: IndexMode) -> Self {
        let (rows, cols) = view.dims();
        let data_rows = rows.saturating_sub(1);
        let mut index = ColumnIndex {
            headers: Vec::with_capacity(cols),
            columns: FxHashMap::default(),
            rows: data_rows,
        };
        if rows == 0 {
            return index;
        }

        let keys: Vec<String> = (0..cols)
            .map(|c| criteria_text(view.cell(0, c)).into_owned())
            .collect();

        match mode {
            IndexMode::Data => {
                for (c, key) in keys.into_iter().enumerate() {
                    match index.columns.get_mut(&key) {
                        Some(existing) => {
                            index.headers.push(None);
                            for (slot, r) in existing.iter_mut().zip(1..rows) {
                                if slot.is_empty() {
                                    *slot = view.get_cell(r, c);
                                }
                            }
                        }
                        None => {
                            let values = (1..rows).map(|r| view.get_cell(r, c)).collect();
                            index.headers.push(Some(key.clone()));
                            index.columns.insert(key, values);
                        }
                    }
                }
            }
            IndexMode::Criteria => {
                for key in &keys {
                    index.headers.push(Some(key.clone()));
                    index.columns.entry(key.clone()).or_default();
                }
                // Shared buckets fill row by row, left to right.
                for r in 1..rows {
                    for (c, key) in keys.iter().enumerate() {
                        if let Some(bucket) = index.columns.get_mut(key) {
                            bucket.push(view.get_cell(r, c));
                        }
                    }
                }
            }
        }
        index
    }

    /// Number of columns in the block.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Number of rows below the header row.
    pub fn data_rows(&self) -> usize {
        self.rows
    }

    /// Header registered at a 0-based column, `None` for a repeated data
    /// header or an out-of-range position.
    pub fn header_at(&self, col: usize) -> Option<&str> {
        self.headers.get(col)?.as_deref()
    }

    pub fn headers(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.headers.iter().map(|h| h.as_deref())
    }

    pub fn column(&self, header: &str) -> Option<&[LiteralValue]> {
        self.columns.get(header).map(Vec::as_slice)
    }

    /// The stored key equal to `header`, borrowed from the index.
    pub fn column_key(&self, header: &str) -> Option<&str> {
        self.columns.get_key_value(header).map(|(k, _)| k.as_str())
    }

    pub fn contains(&self, header: &str) -> bool {
        self.columns.contains_key(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> LiteralValue {
        LiteralValue::Text(s.into())
    }

    #[test]
    fn empty_range_yields_empty_index() {
        let rows: Vec<Vec<LiteralValue>> = vec![];
        let idx = ColumnIndex::build(&RangeView::from_borrowed(&rows), IndexMode::Data);
        assert_eq!(idx.width(), 0);
        assert_eq!(idx.data_rows(), 0);
        assert!(idx.column("Tree").is_none());
    }

    #[test]
    fn duplicate_data_header_only_backfills_blanks() {
        let rows = vec![
            vec![t("Qty"), t("Qty")],
            vec![LiteralValue::Int(1), LiteralValue::Int(10)],
            vec![LiteralValue::Empty, LiteralValue::Int(20)],
            vec![LiteralValue::Int(3), LiteralValue::Empty],
        ];
        let idx = ColumnIndex::build(&RangeView::from_borrowed(&rows), IndexMode::Data);
        assert_eq!(
            idx.column("Qty").unwrap(),
            &[
                LiteralValue::Int(1),
                LiteralValue::Int(20),
                LiteralValue::Int(3)
            ]
        );
        assert_eq!(idx.header_at(0), Some("Qty"));
        assert_eq!(idx.header_at(1), None);
        assert_eq!(idx.width(), 2);
    }

    #[test]
    fn numeric_headers_are_stringified() {
        let rows = vec![
            vec![LiteralValue::Int(2024), LiteralValue::Boolean(true)],
            vec![LiteralValue::Int(5), LiteralValue::Int(6)],
        ];
        let idx = ColumnIndex::build(&RangeView::from_borrowed(&rows), IndexMode::Data);
        assert_eq!(idx.column("2024").unwrap(), &[LiteralValue::Int(5)]);
        assert!(idx.contains("TRUE"));
    }

    #[test]
    fn duplicate_criteria_header_shares_one_bucket_row_major() {
        let rows = vec![
            vec![t("Height"), t("Tree"), t("Height")],
            vec![t(">10"), t("Apple"), t("<20")],
            vec![t(">30"), LiteralValue::Empty, t("<40")],
        ];
        let idx = ColumnIndex::build(&RangeView::from_borrowed(&rows), IndexMode::Criteria);
        let headers: Vec<_> = idx.headers().collect();
        assert_eq!(headers, vec![Some("Height"), Some("Tree"), Some("Height")]);
        assert_eq!(
            idx.column("Height").unwrap(),
            &[t(">10"), t("<20"), t(">30"), t("<40")]
        );
        assert_eq!(idx.column("Tree").unwrap(), &[t("Apple"), LiteralValue::Empty]);
        assert_eq!(idx.data_rows(), 2);
    }
}
