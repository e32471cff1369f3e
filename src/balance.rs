//! Life-balance radar
//!
//! Averages self-rated life areas. Missing ratings are excluded from the
//! mean rather than counted as zero.

use crate::trend::RunningMean;
use crate::types::{BalanceAxis, Entry, LifeArea};

/// Ratings are on a 0-10 scale
pub const MAX_RATING: f64 = 10.0;

fn valid_rating(value: f64) -> bool {
    value.is_finite() && (0.0..=MAX_RATING).contains(&value)
}

/// One radar axis per life area, in fixed axis order
pub fn life_balance<'a, I>(entries: I) -> Vec<BalanceAxis>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut means = [RunningMean::new(); LifeArea::ALL.len()];

    for ratings in entries.into_iter().filter_map(|e| e.life_balance.as_ref()) {
        for (name, value) in ratings {
            let Some(area) = LifeArea::parse(name) else {
                log::debug!("Ignoring unknown life area '{}'", name);
                continue;
            };
            if !valid_rating(*value) {
                continue;
            }
            if let Some(index) = LifeArea::ALL.iter().position(|a| *a == area) {
                means[index].push(*value);
            }
        }
    }

    LifeArea::ALL
        .iter()
        .zip(means.iter())
        .map(|(area, mean)| BalanceAxis {
            area: *area,
            average: mean.value(),
            samples: mean.count(),
        })
        .collect()
}
