//! Summary statistics over inter-bid time gaps

use botbid_types::DiffStatistic;

/// Linear-interpolated percentile of ascending sorted values.
/// Returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Statistics of one actor's gap sequence, in `DiffStatistic::all()` order.
/// Every entry is `None` when there are no gaps.
pub fn gap_summary(gaps: &[i128]) -> Vec<(DiffStatistic, Option<f64>)> {
    let mut sorted: Vec<f64> = gaps.iter().map(|&g| g as f64).collect();
    sorted.sort_by(f64::total_cmp);

    DiffStatistic::all()
        .into_iter()
        .map(|stat| (stat, statistic(&sorted, stat)))
        .collect()
}

fn statistic(sorted: &[f64], stat: DiffStatistic) -> Option<f64> {
    let first = *sorted.first()?;
    let last = *sorted.last()?;
    Some(match stat {
        DiffStatistic::Min => first,
        DiffStatistic::Max => last,
        DiffStatistic::Mean => sorted.iter().sum::<f64>() / sorted.len() as f64,
        DiffStatistic::Median => percentile(sorted, 50.0)?,
        DiffStatistic::Range => last - first,
        DiffStatistic::Percentile(p) => percentile(sorted, f64::from(p))?,
    })
}

/// Mean of the present values, `None` when none are present
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
