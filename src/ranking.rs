//! Top emotions ranking

use crate::distribution::count_first_seen;
use crate::types::{EmotionCount, Entry};

/// Default number of emotions shown in the ranking
pub const DEFAULT_TOP_LIMIT: usize = 7;

/// Emotions by descending frequency, ties in first-seen order, at most `limit`
pub fn top_emotions<'a, I>(entries: I, limit: usize) -> Vec<EmotionCount>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut counts = count_first_seen(entries);
    // stable: equal counts keep first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(label, count)| EmotionCount { label, count })
        .collect()
}
