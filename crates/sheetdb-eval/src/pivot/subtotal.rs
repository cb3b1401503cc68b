/// Aggregation kind a pivot cell is computed with.
///
/// `Default`, `Data`, `Blank` and `Grand` are placement markers rather than
/// aggregations; only the remaining kinds override a data field's base kind.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubtotalKind {
    #[default]
    Default,
    Data,
    Blank,
    Grand,
    Sum,
    CountA,
    Average,
    Max,
    Min,
    Product,
    Count,
    StdDev,
    StdDevP,
    Var,
    VarP,
}

impl SubtotalKind {
    pub fn is_override(self) -> bool {
        !matches!(
            self,
            SubtotalKind::Default | SubtotalKind::Data | SubtotalKind::Blank | SubtotalKind::Grand
        )
    }

    /// Kinds that report presence and so ignore a recorded error.
    pub fn is_presence_count(self) -> bool {
        matches!(self, SubtotalKind::Count | SubtotalKind::CountA)
    }

    pub fn needs_division(self) -> bool {
        matches!(
            self,
            SubtotalKind::Average
                | SubtotalKind::StdDev
                | SubtotalKind::StdDevP
                | SubtotalKind::Var
                | SubtotalKind::VarP
        )
    }

    /// Effective kind for a cell given the data field's `base` kind and the
    /// field, row and column overrides.
    ///
    /// The column override is consulted only alongside a row override: when
    /// both are set and disagree the cell is `Blank`. Otherwise the row
    /// override wins, then the field override, then `base`.
    pub fn resolve(
        base: SubtotalKind,
        field: SubtotalKind,
        row: SubtotalKind,
        col: SubtotalKind,
    ) -> SubtotalKind {
        if row.is_override() && col.is_override() && row != col {
            return SubtotalKind::Blank;
        }
        [row, field]
            .into_iter()
            .find(|k| k.is_override())
            .unwrap_or(base)
    }
}

#[cfg(test)]
mod tests {
    use super::SubtotalKind::*;
    use super::*;

    #[test]
    fn placement_markers_do_not_override() {
        for k in [Default, Data, Blank, Grand] {
            assert!(!k.is_override(), "{k:?}");
        }
        assert!(Sum.is_override());
        assert!(VarP.is_override());
    }

    #[test]
    fn precedence_row_then_field_then_base() {
        assert_eq!(SubtotalKind::resolve(Sum, Default, Default, Default), Sum);
        assert_eq!(SubtotalKind::resolve(Sum, Average, Default, Default), Average);
        assert_eq!(SubtotalKind::resolve(Sum, Average, Max, Grand), Max);
        assert_eq!(SubtotalKind::resolve(Sum, Average, Count, Count), Count);
    }

    #[test]
    fn column_override_alone_changes_nothing() {
        assert_eq!(SubtotalKind::resolve(Sum, Average, Data, Min), Average);
        assert_eq!(SubtotalKind::resolve(Sum, Default, Default, Min), Sum);
        assert_eq!(SubtotalKind::resolve(Var, Default, Grand, Product), Var);
    }

    #[test]
    fn conflicting_row_and_column_blank_the_cell() {
        assert_eq!(SubtotalKind::resolve(Sum, Default, Max, Min), Blank);
        assert_eq!(SubtotalKind::resolve(Sum, Var, Product, Count), Blank);
    }

    #[test]
    fn classification_helpers() {
        assert!(Count.is_presence_count());
        assert!(CountA.is_presence_count());
        assert!(!Sum.is_presence_count());
        assert!(Average.needs_division());
        assert!(StdDev.needs_division());
        assert!(!Product.needs_division());
    }
}
