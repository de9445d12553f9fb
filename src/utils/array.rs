/// Index of the largest value, first occurrence on ties.
///
/// NaN entries never win. Returns `None` for an empty input.
pub fn argmax<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f32>,
{
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in values.into_iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Pad or trim an array to exactly the specified length.
/// Padding is added to the right, trimming is done from the right.
pub fn fix_length<T: Clone>(data: &[T], length: usize, fill_value: T) -> Vec<T> {
    if data.len() >= length {
        data[..length].to_vec()
    } else {
        let mut result = data.to_vec();
        result.resize(length, fill_value);
        result
    }
}

/// Pick peaks from a signal with threshold and spacing constraints.
///
/// A sample `x[n]` is a peak when all of the following hold:
/// - `x[n] == max(x[n - pre_max .. n + post_max])`
/// - `x[n] >= mean(x[n - pre_avg .. n + post_avg]) + delta`
/// - `n - previous_peak > wait`
///
/// Windows are half-open and clipped to the signal bounds. Zero-valued
/// samples are never reported.
pub fn peak_pick(
    x: &[f32],
    pre_max: usize,
    post_max: usize,
    pre_avg: usize,
    post_avg: usize,
    delta: f32,
    wait: usize,
) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;

    for i in 0..x.len() {
        if x[i] == 0.0 {
            continue;
        }

        let start_max = i.saturating_sub(pre_max);
        let end_max = (i + post_max).min(x.len()).max(i + 1);
        let window_max = x[start_max..end_max]
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        if x[i] != window_max {
            continue;
        }

        let start_avg = i.saturating_sub(pre_avg);
        let end_avg = (i + post_avg).min(x.len()).max(i + 1);
        let window = &x[start_avg..end_avg];
        let avg = window.iter().sum::<f32>() / window.len() as f32;
        if x[i] < avg + delta {
            continue;
        }

        if let Some(last) = last_peak
            && i <= last + wait
        {
            continue;
        }

        peaks.push(i);
        last_peak = Some(i);
    }

    peaks
}
