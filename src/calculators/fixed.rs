//! Fixed-date rules: the same month and day every year.

use chrono::prelude::*;

use crate::calculators::{Calculator, ResolveCtx};
use crate::errors::CalendarError;
use crate::rules::{HolidayRule, RuleParams};

/// Strategy for [`RuleParams::Fixed`].
#[derive(Debug, Copy, Clone, Default)]
pub struct FixedCalculator;

impl Calculator for FixedCalculator {
    fn dates(
        &self,
        rule: &HolidayRule,
        year: i32,
        _ctx: &ResolveCtx,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        let RuleParams::Fixed { month, day } = rule.params else {
            return Err(mismatch(rule));
        };
        // Feb 29 rules legitimately skip non-leap years
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(d) => Ok(vec![d.and_hms_opt(0, 0, 0).unwrap()]),
            None => Ok(vec![]),
        }
    }
}

pub(crate) fn mismatch(rule: &HolidayRule) -> CalendarError {
    CalendarError::InvalidHolidayRule {
        rule: rule.id.clone(),
        reason: format!("parameters do not match the '{}' calculator", rule.kind()),
    }
}

// UNIT TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::CalculatorSet;
    use crate::dates::ndt;
    use indexmap::IndexMap;

    fn compute(rule: &HolidayRule, year: i32) -> Vec<NaiveDateTime> {
        let rules: IndexMap<String, HolidayRule> =
            IndexMap::from([(rule.id.clone(), rule.clone())]);
        let calcs = CalculatorSet::with_defaults();
        let ctx = ResolveCtx::new(&rules, &calcs);
        ctx.compute(rule, year).unwrap()
    }

    #[test]
    fn test_fixed_date() {
        let rule = HolidayRule::new(
            "christmas",
            "Christmas Day",
            "de",
            RuleParams::Fixed { month: 12, day: 25 },
        );
        assert_eq!(compute(&rule, 2024), vec![ndt(2024, 12, 25)]);
        assert_eq!(compute(&rule, 1999), vec![ndt(1999, 12, 25)]);
    }

    #[test]
    fn test_leap_day_skips_common_years() {
        let rule = HolidayRule::new(
            "leap",
            "Leap Day",
            "*",
            RuleParams::Fixed { month: 2, day: 29 },
        );
        assert_eq!(compute(&rule, 2024), vec![ndt(2024, 2, 29)]);
        assert!(compute(&rule, 2023).is_empty());
    }
}
