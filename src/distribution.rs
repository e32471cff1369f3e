//! Emotion distribution
//!
//! Share of each recognized emotion among labeled entries. Unlabeled or
//! unrecognized entries are not part of the denominator.

use crate::scoring::Emotion;
use crate::types::{DistributionSlice, Entry};

/// Count recognized emotions, keeping the order each label was first seen
pub(crate) fn count_first_seen<'a, I>(entries: I) -> Vec<(Emotion, usize)>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut counts: Vec<(Emotion, usize)> = Vec::new();
    for emotion in entries.into_iter().filter_map(Entry::emotion) {
        match counts.iter_mut().find(|(seen, _)| *seen == emotion) {
            Some((_, count)) => *count += 1,
            None => counts.push((emotion, 1)),
        }
    }
    counts
}

/// Percentage and count per emotion, in first-seen order
///
/// Returns an empty list when no entry carries a recognized label.
pub fn distribute<'a, I>(entries: I) -> Vec<DistributionSlice>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let counts = count_first_seen(entries);
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return Vec::new();
    }

    counts
        .into_iter()
        .map(|(label, count)| DistributionSlice {
            label,
            percent: (100.0 * count as f64 / total as f64).round() as u32,
            count,
        })
        .collect()
}
