use ordered_float::NotNan;

use crate::{
    alternatives::Alternative,
    criteria::{Criterion, CriterionKind},
    error::Error,
    num::finite,
};

/// Observed range of one criterion across all stored alternatives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

/// Compute the range of every criterion column. Columns are empty (and the result is empty) when
/// there are no alternatives.
pub fn column_ranges(dimensions: usize, alternatives: &[Alternative]) -> Vec<ColumnRange> {
    if alternatives.is_empty() {
        return Vec::new();
    }
    (0..dimensions)
        .map(|j| {
            alternatives
                .iter()
                .map(|a| a.values[j].into_inner())
                .fold(
                    ColumnRange {
                        min: f64::INFINITY,
                        max: f64::NEG_INFINITY,
                    },
                    |range, v| ColumnRange {
                        min: range.min.min(v),
                        max: range.max.max(v),
                    },
                )
        })
        .collect()
}

/// Scale a raw value against its column. Raw values are non-negative, so results fall in `[0, 1]`.
/// - Benefit: `value / max`, so the best observed value maps to 1.
/// - Cost: `min / value`, so the cheapest observed value maps to 1.
pub fn normalize_value(
    criterion: &Criterion,
    index: usize,
    range: ColumnRange,
    value: f64,
) -> Result<NotNan<f64>, Error> {
    let degenerate = |reason| Error::DegenerateRange {
        criterion: criterion.name.clone(),
        index,
        reason,
    };
    let normalized = match criterion.kind {
        CriterionKind::Benefit if range.max == 0.0 => {
            return Err(degenerate("maximum observed value is zero"))
        }
        CriterionKind::Benefit => value / range.max,
        CriterionKind::Cost if value == 0.0 => return Err(degenerate("cost value is zero")),
        CriterionKind::Cost => range.min / value,
    };
    finite(normalized).ok_or_else(|| degenerate("normalized value overflows"))
}

/// Normalize every stored alternative against the full set. Rows follow the order of
/// `alternatives`, columns the order of `criteria`.
pub fn normalize(
    criteria: &[Criterion],
    alternatives: &[Alternative],
) -> Result<Vec<Vec<NotNan<f64>>>, Error> {
    debug_assert!(alternatives.iter().all(|a| a.values.len() == criteria.len()));
    let ranges = column_ranges(criteria.len(), alternatives);
    tracing::trace!(?ranges, "column ranges");
    alternatives
        .iter()
        .map(|alternative| {
            criteria
                .iter()
                .zip(&ranges)
                .zip(alternative.raw_values())
                .enumerate()
                .map(|(index, ((criterion, range), value))| {
                    normalize_value(criterion, index, *range, value)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}
