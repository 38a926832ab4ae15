use crate::domain::SourceReading;

fn present(readings: &[SourceReading]) -> impl Iterator<Item = f64> + '_ {
    readings.iter().filter_map(|r| r.value)
}

/// Unweighted mean of the present readings.
pub fn consensus(readings: &[SourceReading]) -> Option<f64> {
    let (sum, count) = present(readings).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// `max - min` of the present readings; undefined below two data points.
pub fn spread(readings: &[SourceReading]) -> Option<f64> {
    let mut values = present(readings);
    let first = values.next()?;
    let second = values.next()?;

    let (mut lo, mut hi) = (first.min(second), first.max(second));
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Some(hi - lo)
}
