//! Mergeable online statistics for pivot subtotals.
//!
//! [`StreamingStats`] is filled by a scan (`add`, `add_count`, `add_error`),
//! optionally merged with accumulators built over other partitions
//! (`union`), then frozen with [`StreamingStats::finalize`]. The
//! [`FinalizedStats`] it returns is read-only; turning it back into an
//! accumulator goes through [`FinalizedStats::reset`].
//!
//! Moments use Welford's single-pass update and Chan's pairwise merge, in
//! the exact operation order below. Rewriting either into an algebraically
//! equal form changes the low bits of the results.

use super::subtotal::SubtotalKind;
use rayon::prelude::*;
use sheetdb_common::{ExcelError, ExcelErrorKind, LiteralValue};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StreamingStats {
    count: u64,
    count_nums: u64,
    min: f64,
    max: f64,
    sum: f64,
    product: f64,
    mean: f64,
    m2: f64,
    error: Option<ExcelErrorKind>,
    is_calculated: bool,
}

impl Default for StreamingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            count_nums: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            product: 1.0,
            mean: 0.0,
            m2: 0.0,
            error: None,
            is_calculated: false,
        }
    }

    /// An accumulator for a calculated item: it materializes even when no
    /// rows reached it, and reports raw extremes for `Max`/`Min`.
    pub fn calculated() -> Self {
        Self {
            is_calculated: true,
            ..Self::new()
        }
    }

    /// Clear every running total. The calculated flag is kept.
    pub fn reset(&mut self) {
        *self = Self {
            is_calculated: self.is_calculated,
            ..Self::new()
        };
    }

    pub fn add(&mut self, x: f64) {
        self.count += 1;
        self.count_nums += 1;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
        self.sum += x;
        self.product *= x;
        let delta = x - self.mean;
        self.mean += delta / self.count_nums as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Count a row without touching the numeric moments.
    pub fn add_count(&mut self) {
        self.count += 1;
    }

    /// Record an error; the first one recorded is kept.
    pub fn add_error(&mut self, kind: ExcelErrorKind) {
        self.error.get_or_insert(kind);
    }

    /// Route one cell: numbers are added, errors recorded, blanks skipped and
    /// anything else only counted.
    pub fn add_value(&mut self, value: &LiteralValue) {
        match value {
            LiteralValue::Number(n) => self.add(*n),
            LiteralValue::Int(i) => self.add(*i as f64),
            LiteralValue::Error(e) => self.add_error(e.kind),
            LiteralValue::Empty => {}
            _ => self.add_count(),
        }
    }

    /// Fold an independently accumulated partition into `self`.
    ///
    /// Only one error slot exists: when both sides carry an error, the one
    /// already held by `self` survives.
    pub fn union(&mut self, other: StreamingStats) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            left = self.count_nums,
            right = other.count_nums,
            "stats_union"
        );
        self.is_calculated |= other.is_calculated;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.product *= other.product;
        let delta = other.mean - self.mean;
        let n = self.count_nums + other.count_nums;
        if n > 0 {
            let (na, nb, n) = (self.count_nums as f64, other.count_nums as f64, n as f64);
            self.mean += delta * nb / n;
            self.m2 += other.m2 + delta * delta * na * nb / n;
        }
        self.count += other.count;
        self.count_nums += other.count_nums;
        if self.error.is_none() {
            self.error = other.error;
        }
    }

    /// Consuming form of [`union`](Self::union), handy as a reduce step.
    pub fn merged(mut self, other: StreamingStats) -> Self {
        self.union(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.count_nums == 0
    }

    pub fn is_calculated(&self) -> bool {
        self.is_calculated
    }

    pub fn mark_calculated(&mut self) {
        self.is_calculated = true;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn count_nums(&self) -> u64 {
        self.count_nums
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 0 when no number was added.
    pub fn product(&self) -> f64 {
        if self.count_nums > 0 { self.product } else { 0.0 }
    }

    /// Sample variance; 0 below two numbers.
    pub fn var(&self) -> f64 {
        if self.count_nums > 1 {
            self.m2 / (self.count_nums - 1) as f64
        } else {
            0.0
        }
    }

    /// Population variance; 0 when no number was added.
    pub fn var_p(&self) -> f64 {
        if self.count_nums > 0 {
            self.m2 / self.count_nums as f64
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.var().sqrt()
    }

    pub fn std_dev_p(&self) -> f64 {
        self.var_p().sqrt()
    }

    pub fn error(&self) -> Option<ExcelErrorKind> {
        self.error
    }

    pub fn finalize(self) -> FinalizedStats {
        FinalizedStats { stats: self }
    }
}

impl FromIterator<f64> for StreamingStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = StreamingStats::new();
        stats.extend(iter);
        stats
    }
}

impl Extend<f64> for StreamingStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

/// Accumulate `values` in parallel: each chunk of `chunk` values is scanned
/// into its own accumulator and the partials are merged pairwise.
pub fn accumulate_parallel(values: &[f64], chunk: usize) -> StreamingStats {
    values
        .par_chunks(chunk.max(1))
        .map(|part| part.iter().copied().collect::<StreamingStats>())
        .reduce(StreamingStats::new, StreamingStats::merged)
}

/// A finished accumulator, read through [`materialize`](Self::materialize).
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedStats {
    stats: StreamingStats,
}

impl FinalizedStats {
    pub fn stats(&self) -> &StreamingStats {
        &self.stats
    }

    /// Back to an empty accumulator, keeping the calculated flag.
    pub fn reset(self) -> StreamingStats {
        let mut stats = self.stats;
        stats.reset();
        stats
    }

    /// Cell value for a pivot position.
    ///
    /// `None` means the cell is left out: the accumulator saw nothing and is
    /// not a calculated item, or the row and column overrides conflict.
    pub fn materialize(
        &self,
        base: SubtotalKind,
        field: SubtotalKind,
        row: SubtotalKind,
        col: SubtotalKind,
    ) -> Option<LiteralValue> {
        let s = &self.stats;
        if s.is_empty() && !s.is_calculated {
            return None;
        }
        let kind = SubtotalKind::resolve(base, field, row, col);
        if kind == SubtotalKind::Blank {
            return None;
        }
        if let Some(err) = s.error
            && !kind.is_presence_count()
        {
            return Some(LiteralValue::Error(ExcelError::new(err)));
        }

        let needed = match kind {
            SubtotalKind::StdDev | SubtotalKind::Var => 2,
            k if k.needs_division() => 1,
            _ => 0,
        };
        if s.count_nums < needed {
            return Some(LiteralValue::Error(ExcelError::new_div()));
        }

        let extreme = |v: f64| {
            if s.is_calculated || s.count_nums > 0 { v } else { 0.0 }
        };
        let n = match kind {
            SubtotalKind::Count => s.count_nums as f64,
            SubtotalKind::CountA => s.count as f64,
            SubtotalKind::Max => extreme(s.max),
            SubtotalKind::Min => extreme(s.min),
            SubtotalKind::Product => s.product(),
            SubtotalKind::Average => s.mean,
            SubtotalKind::StdDev => s.std_dev(),
            SubtotalKind::StdDevP => s.std_dev_p(),
            SubtotalKind::Var => s.var(),
            SubtotalKind::VarP => s.var_p(),
            _ => s.sum,
        };
        Some(LiteralValue::Number(n))
    }
}
