//! Observance adjustment: shifting a holiday that lands on a non-business day.

use std::collections::HashSet;

use chrono::prelude::*;
use chrono::Days;
use serde::{Deserialize, Serialize};

/// Policy for moving an observed holiday off a weekend.
///
/// Which days count as the weekend is supplied by the caller (per locale),
/// not hard-coded here.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Observance {
    /// Observe on the actual date without adjustment.
    #[default]
    Exact,
    /// Shift forward to the next non-weekend day.
    Following,
    /// Shift backward to the preceding non-weekend day.
    Previous,
    /// Shift to the closest non-weekend day, e.g. Saturday to Friday and
    /// Sunday to Monday under a Western weekend. Ties shift forward.
    Nearest,
}

impl Observance {
    /// The observed date for `date` under this policy and `weekend` mask.
    ///
    /// A mask covering every day of the week leaves dates unadjusted, since
    /// no day could satisfy the shift.
    pub fn observed(&self, date: &NaiveDateTime, weekend: &HashSet<Weekday>) -> NaiveDateTime {
        if weekend.len() >= 7 || !weekend.contains(&date.weekday()) {
            return *date;
        }
        match self {
            Observance::Exact => *date,
            Observance::Following => {
                let mut d = *date;
                while weekend.contains(&d.weekday()) {
                    d = d + Days::new(1);
                }
                d
            }
            Observance::Previous => {
                let mut d = *date;
                while weekend.contains(&d.weekday()) {
                    d = d - Days::new(1);
                }
                d
            }
            Observance::Nearest => {
                for k in 1..=6_u64 {
                    let back = *date - Days::new(k);
                    let fwd = *date + Days::new(k);
                    if !weekend.contains(&back.weekday()) && !weekend.contains(&fwd.weekday()) {
                        return fwd;
                    } else if !weekend.contains(&back.weekday()) {
                        return back;
                    } else if !weekend.contains(&fwd.weekday()) {
                        return fwd;
                    }
                }
                *date
            }
        }
    }
}
