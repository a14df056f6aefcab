//! Easter-relative rules and the Gregorian computus.

use chrono::prelude::*;
use chrono::Days;

use crate::calculators::fixed::mismatch;
use crate::calculators::{Calculator, ResolveCtx};
use crate::dates::{is_valid_year, ndt};
use crate::errors::CalendarError;
use crate::rules::{HolidayRule, RuleParams};

/// The Gregorian date of Easter Sunday.
///
/// Anonymous Gregorian computus: closed form, no search. Valid for the
/// supported year range (Gregorian reform onward).
pub fn easter_sunday(year: i32) -> Result<NaiveDateTime, CalendarError> {
    if !is_valid_year(year) {
        return Err(CalendarError::InvalidDate(format!(
            "year {} is outside the supported Gregorian range",
            year
        )));
    }
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    Ok(ndt(year, month as u32, day as u32))
}

/// Strategy for [`RuleParams::EasterOffset`].
#[derive(Debug, Copy, Clone, Default)]
pub struct EasterCalculator;

impl Calculator for EasterCalculator {
    fn dates(
        &self,
        rule: &HolidayRule,
        year: i32,
        _ctx: &ResolveCtx,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        let RuleParams::EasterOffset { days } = rule.params else {
            return Err(mismatch(rule));
        };
        let easter = easter_sunday(year)?;
        let offset = Days::new(u64::from(days.unsigned_abs()));
        Ok(vec![if days < 0 { easter - offset } else { easter + offset }])
    }
}

// UNIT TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::CalculatorSet;
    use indexmap::IndexMap;

    #[test]
    fn test_easter_reference_dates() {
        // published reference table
        let expected = [
            (2000, 4, 23),
            (2008, 3, 23),
            (2011, 4, 24),
            (2016, 3, 27),
            (2023, 4, 9),
            (2024, 3, 31),
            (2025, 4, 20),
            (2026, 4, 5),
            (2038, 4, 25),
            (1900, 4, 15),
            (1943, 4, 25),
            (2100, 3, 28),
        ];
        for (y, m, d) in expected {
            assert_eq!(easter_sunday(y).unwrap(), ndt(y, m, d), "easter {}", y);
        }
    }

    #[test]
    fn test_easter_is_always_a_sunday_in_window() {
        for year in 1900..=2100 {
            let e = easter_sunday(year).unwrap();
            assert_eq!(e.weekday(), Weekday::Sun, "easter {}", year);
            // Easter falls between March 22 and April 25 inclusive
            assert!(e >= ndt(year, 3, 22) && e <= ndt(year, 4, 25), "easter {}", year);
        }
    }

    #[test]
    fn test_easter_out_of_range() {
        assert!(easter_sunday(1500).is_err());
        assert!(easter_sunday(5000).is_err());
    }

    #[test]
    fn test_offsets() {
        let rules: IndexMap<String, HolidayRule> = IndexMap::new();
        let calcs = CalculatorSet::with_defaults();
        let ctx = ResolveCtx::new(&rules, &calcs);

        // Good Friday 2024 = March 29, Easter Monday = April 1
        let good_friday = HolidayRule::new(
            "good-friday",
            "Good Friday",
            "de",
            RuleParams::EasterOffset { days: -2 },
        );
        assert_eq!(
            ctx.compute(&good_friday, 2024).unwrap(),
            vec![ndt(2024, 3, 29)]
        );

        let easter_monday = HolidayRule::new(
            "easter-monday",
            "Easter Monday",
            "de",
            RuleParams::EasterOffset { days: 1 },
        );
        assert_eq!(
            ctx.compute(&easter_monday, 2024).unwrap(),
            vec![ndt(2024, 4, 1)]
        );

        // Whit Monday 2023 = May 29 (Easter April 9 + 50)
        let whit = HolidayRule::new(
            "whit-monday",
            "Whit Monday",
            "de",
            RuleParams::EasterOffset { days: 50 },
        );
        assert_eq!(ctx.compute(&whit, 2023).unwrap(), vec![ndt(2023, 5, 29)]);
    }
}
