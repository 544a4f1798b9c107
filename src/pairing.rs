//! Deterministic index pairing for bulk connects.
//!
//! Marked ports are partitioned by direction and sorted by display key
//! before this runs; pairing itself is purely index-based.

/// Pair every output index with an input index. With `n` the larger of the
/// two counts, exactly `n` pairs are produced and every valid index of both
/// lists appears in at least one pair. Either side empty yields no pairs.
pub fn pair(outputs: usize, inputs: usize) -> Vec<(usize, usize)> {
    if outputs == 0 || inputs == 0 {
        return Vec::new();
    }
    let n = outputs.max(inputs);
    (0..n).map(|k| (k * outputs / n, k * inputs / n)).collect()
}
