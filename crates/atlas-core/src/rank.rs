//! Within-group descending ranks.

use std::collections::HashMap;
use std::hash::Hash;

/// Rank `values` in descending order within each group of `groups`.
///
/// Rank 1 is the highest value of its group. Tied values receive the average
/// of the positions they span, so `[100, 100, 50]` ranks as `[1.5, 1.5, 3]`.
/// NaN values are not ranked and come back as NaN.
///
/// `groups` and `values` are parallel slices; the result has the same length.
pub fn grouped_descending_rank<G: Eq + Hash>(groups: &[G], values: &[f64]) -> Vec<f64> {
    assert_eq!(groups.len(), values.len(), "groups and values must be parallel");
    let mut members: HashMap<&G, Vec<usize>> = HashMap::new();
    for (i, g) in groups.iter().enumerate() {
        if !values[i].is_nan() {
            members.entry(g).or_default().push(i);
        }
    }

    let mut ranks = vec![f64::NAN; values.len()];
    for idx in members.values_mut() {
        idx.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
        let mut start = 0;
        while start < idx.len() {
            let v = values[idx[start]];
            let mut end = start + 1;
            while end < idx.len() && values[idx[end]] == v {
                end += 1;
            }
            // positions start+1 ..= end, averaged
            let avg = (start + 1 + end) as f64 / 2.0;
            for &i in &idx[start..end] {
                ranks[i] = avg;
            }
            start = end;
        }
    }
    ranks
}
