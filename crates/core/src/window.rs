use std::collections::HashSet;

/// Merge a freshly fetched batch into an existing window.
///
/// Values of `incoming` already present in `existing` are dropped; duplicates
/// inside `incoming` itself are kept. The concatenation `existing ++ filtered`
/// is then trimmed from the front so that at most `window_size` of the most
/// recent values survive.
pub fn merge_window(existing: &[i64], incoming: &[i64], window_size: usize) -> Vec<i64> {
    let seen: HashSet<i64> = existing.iter().copied().collect();

    let mut window = Vec::with_capacity(existing.len() + incoming.len());
    window.extend_from_slice(existing);
    window.extend(incoming.iter().copied().filter(|n| !seen.contains(n)));

    // Oldest values live at the front.
    if window.len() > window_size {
        let excess = window.len() - window_size;
        window.drain(..excess);
    }

    window
}

/// Arithmetic mean rounded to two decimal places (half away from zero).
/// An empty window averages to `0.0`.
pub fn average(window: &[i64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: i128 = window.iter().map(|&n| i128::from(n)).sum();
    round2(sum as f64 / window.len() as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
