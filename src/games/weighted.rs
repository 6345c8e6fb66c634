//! Weighted discrete draw shared by the outcome engines
//!
//! Weights are percentages summing to at most 100. A draw `d` in `[0, 100)`
//! selects the first entry whose cumulative weight is strictly greater than `d`,
//! so each band is `[previous cumulative, cumulative)`. A draw landing in the
//! uncovered remainder selects nothing and the caller falls back to its default.

/// Index of the entry a given draw lands on, if any
pub fn select_index<I>(weights: I, draw: f64) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut cumulative = 0.0;
    for (index, weight) in weights.into_iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return Some(index);
        }
    }
    None
}
