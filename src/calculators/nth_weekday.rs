//! Nth-weekday rules: "the third Monday of January" and the like.

use chrono::NaiveDateTime;

use crate::calculators::fixed::mismatch;
use crate::calculators::{Calculator, ResolveCtx};
use crate::dates::nth_weekday_of_month;
use crate::errors::CalendarError;
use crate::rules::{HolidayRule, RuleParams};

/// Strategy for [`RuleParams::NthWeekday`].
#[derive(Debug, Copy, Clone, Default)]
pub struct NthWeekdayCalculator;

impl Calculator for NthWeekdayCalculator {
    fn dates(
        &self,
        rule: &HolidayRule,
        year: i32,
        _ctx: &ResolveCtx,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        let RuleParams::NthWeekday { month, weekday, nth } = rule.params else {
            return Err(mismatch(rule));
        };
        match nth_weekday_of_month(year, month, weekday, nth) {
            Some(d) => Ok(vec![d]),
            None => Err(CalendarError::InvalidHolidayRule {
                rule: rule.id.clone(),
                reason: format!(
                    "{}-{:02} has no occurrence {} of {}",
                    year, month, nth, weekday
                ),
            }),
        }
    }
}
