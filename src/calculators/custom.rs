//! Custom rules: dates produced by a user-supplied pure function.

use chrono::prelude::*;

use crate::calculators::fixed::mismatch;
use crate::calculators::{Calculator, ResolveCtx};
use crate::errors::CalendarError;
use crate::rules::{HolidayRule, RuleParams};

/// Strategy for [`RuleParams::Custom`].
///
/// The callback's output is validated before use: every date must carry a
/// null time component and fall inside the requested year.
#[derive(Debug, Copy, Clone, Default)]
pub struct CustomCalculator;

impl Calculator for CustomCalculator {
    fn dates(
        &self,
        rule: &HolidayRule,
        year: i32,
        _ctx: &ResolveCtx,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        let RuleParams::Custom { calc } = &rule.params else {
            return Err(mismatch(rule));
        };
        let dates = calc.call(year);
        for d in &dates {
            if d.year() != year {
                return Err(CalendarError::InvalidCalculatorOutput {
                    rule: rule.id.clone(),
                    reason: format!("date {} is outside year {}", d.date(), year),
                });
            }
            if d.num_seconds_from_midnight() != 0 {
                return Err(CalendarError::InvalidCalculatorOutput {
                    rule: rule.id.clone(),
                    reason: format!("date {} carries a time component", d),
                });
            }
        }
        Ok(dates)
    }
}
