//! Lunisolar (Chinese lunar) rules and the lunar-to-Gregorian conversion.
//!
//! The conversion uses the standard packed month-length table covering the
//! lunar years 1900..=2100. Each entry encodes, for one lunar year: bits
//! 0x8000 down to 0x10 flag a 30-day (set) or 29-day (clear) regular month
//! 1..=12; the low nibble holds the intercalary (leap) month number, zero
//! when the year has none; bit 0x10000 gives the leap month 30 days instead
//! of 29. Lunar year 1900 began on 31 January 1900.

use chrono::prelude::*;
use chrono::Days;

use crate::calculators::fixed::mismatch;
use crate::calculators::{Calculator, ResolveCtx};
use crate::dates::ndt;
use crate::errors::CalendarError;
use crate::rules::{HolidayRule, RuleParams};

/// First lunar year covered by [`LUNAR_INFO`].
pub const LUNAR_BASE_YEAR: i32 = 1900;
/// Last lunar year covered by [`LUNAR_INFO`].
pub const LUNAR_MAX_YEAR: i32 = 2100;

#[rustfmt::skip]
const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900-1909
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910-1919
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920-1929
    0x06566, 0x0d4a0, 0x0ea50, 0x06e95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930-1939
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940-1949
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950-1959
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960-1969
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970-1979
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980-1989
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990-1999
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000-2009
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010-2019
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020-2029
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030-2039
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040-2049
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050-2059
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060-2069
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070-2079
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080-2089
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090-2099
    0x0d520,                                                                                  // 2100
];

fn info(year: i32) -> u32 {
    LUNAR_INFO[(year - LUNAR_BASE_YEAR) as usize]
}

/// The intercalary month of a lunar year, zero when it has none.
fn leap_month(year: i32) -> u32 {
    info(year) & 0xf
}

/// Days in the intercalary month, zero when the year has none.
fn leap_month_days(year: i32) -> u32 {
    if leap_month(year) == 0 {
        0
    } else if info(year) & 0x10000 != 0 {
        30
    } else {
        29
    }
}

/// Days in regular lunar month `month` (1..=12) of `year`.
fn month_days(year: i32, month: u32) -> u32 {
    if info(year) & (0x8000 >> (month - 1)) != 0 {
        30
    } else {
        29
    }
}

/// Total days in a lunar year, intercalary month included.
fn year_days(year: i32) -> u32 {
    (1..=12).map(|m| month_days(year, m)).sum::<u32>() + leap_month_days(year)
}

fn in_table(year: i32) -> Result<(), CalendarError> {
    if !(LUNAR_BASE_YEAR..=LUNAR_MAX_YEAR).contains(&year) {
        return Err(CalendarError::InvalidDate(format!(
            "year {} is outside the lunar table range {}..={}",
            year, LUNAR_BASE_YEAR, LUNAR_MAX_YEAR
        )));
    }
    Ok(())
}

/// The Gregorian date on which lunar year `year` begins (lunar new year).
pub fn lunar_new_year(year: i32) -> Result<NaiveDateTime, CalendarError> {
    in_table(year)?;
    let offset: u32 = (LUNAR_BASE_YEAR..year).map(year_days).sum();
    Ok(ndt(1900, 1, 31) + Days::new(offset as u64))
}

/// Convert a lunar month/day of lunar year `year` to its Gregorian date.
///
/// `leap` pins the intercalary month. Returns `Ok(None)` when the requested
/// day does not exist that year: day 30 of a 29-day month, or a pinned leap
/// month the year does not have.
pub fn lunar_to_solar(
    year: i32,
    month: u32,
    day: u32,
    leap: bool,
) -> Result<Option<NaiveDateTime>, CalendarError> {
    in_table(year)?;
    if !(1..=12).contains(&month) || !(1..=30).contains(&day) {
        return Err(CalendarError::InvalidDate(format!(
            "no lunar month/day {:02}-{:02}",
            month, day
        )));
    }
    let lm = leap_month(year);
    if leap && lm != month {
        return Ok(None);
    }
    let mut offset: u32 = (1..month).map(|m| month_days(year, m)).sum();
    if lm != 0 && lm < month {
        offset += leap_month_days(year);
    }
    // the intercalary month follows its regular namesake
    let len = if leap {
        offset += month_days(year, month);
        leap_month_days(year)
    } else {
        month_days(year, month)
    };
    if day > len {
        return Ok(None);
    }
    Ok(Some(lunar_new_year(year)? + Days::new((offset + day - 1) as u64)))
}

/// Strategy for [`RuleParams::Lunar`].
#[derive(Debug, Copy, Clone, Default)]
pub struct LunarCalculator;

impl Calculator for LunarCalculator {
    fn dates(
        &self,
        rule: &HolidayRule,
        year: i32,
        _ctx: &ResolveCtx,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        let RuleParams::Lunar { month, day, leap } = rule.params else {
            return Err(mismatch(rule));
        };
        Ok(lunar_to_solar(year, month, day, leap)?.into_iter().collect())
    }
}

// UNIT TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::CalculatorSet;
    use indexmap::IndexMap;

    #[test]
    fn test_lunar_new_year_reference_dates() {
        let expected = [
            (1900, 1, 31),
            (1901, 2, 19),
            (1995, 1, 31),
            (2000, 2, 5),
            (2020, 1, 25),
            (2021, 2, 12),
            (2022, 2, 1),
            (2023, 1, 22),
            (2024, 2, 10),
            (2025, 1, 29),
            (2026, 2, 17),
        ];
        for (y, m, d) in expected {
            assert_eq!(lunar_new_year(y).unwrap(), ndt(y, m, d), "cny {}", y);
        }
    }

    #[test]
    fn test_lunar_to_solar_reference_dates() {
        // Mid-Autumn Festival, lunar 8/15
        assert_eq!(
            lunar_to_solar(2024, 8, 15, false).unwrap(),
            Some(ndt(2024, 9, 17))
        );
        assert_eq!(
            lunar_to_solar(2023, 8, 15, false).unwrap(),
            Some(ndt(2023, 9, 29))
        );
        // Buddha's Birthday, lunar 4/8
        assert_eq!(
            lunar_to_solar(2024, 4, 8, false).unwrap(),
            Some(ndt(2024, 5, 15))
        );
    }

    #[test]
    fn test_leap_month_handling() {
        // 2023 intercalates month 2 (starts 22 March 2023)
        assert_eq!(leap_month(2023), 2);
        assert_eq!(
            lunar_to_solar(2023, 2, 1, true).unwrap(),
            Some(ndt(2023, 3, 22))
        );
        // a pinned leap month in a year without one yields nothing
        assert_eq!(lunar_to_solar(2024, 2, 1, true).unwrap(), None);
        // the naive approximation (ignoring the leap month) would land
        // dates after it one lunar month early; month 3 follows the leap
        assert_eq!(
            lunar_to_solar(2023, 3, 1, false).unwrap(),
            Some(ndt(2023, 4, 20))
        );
    }

    #[test]
    fn test_short_month_day_30_absent() {
        // lunar month 1 of 2024 has 29 days
        assert_eq!(month_days(2024, 1), 29);
        assert_eq!(lunar_to_solar(2024, 1, 30, false).unwrap(), None);
        assert!(lunar_to_solar(2024, 1, 29, false).unwrap().is_some());
    }

    #[test]
    fn test_out_of_table_range() {
        assert!(lunar_new_year(1899).is_err());
        assert!(lunar_to_solar(2101, 1, 1, false).is_err());
    }

    #[test]
    fn test_year_lengths_are_plausible() {
        for year in LUNAR_BASE_YEAR..=LUNAR_MAX_YEAR {
            let days = year_days(year);
            assert!((353..=385).contains(&days), "year {} has {} days", year, days);
        }
    }

    #[test]
    fn test_calculator_dispatch() {
        let rules: IndexMap<String, HolidayRule> = IndexMap::new();
        let calcs = CalculatorSet::with_defaults();
        let ctx = ResolveCtx::new(&rules, &calcs);
        let seollal = HolidayRule::new(
            "seollal",
            "Korean New Year",
            "kr",
            RuleParams::Lunar { month: 1, day: 1, leap: false },
        );
        assert_eq!(ctx.compute(&seollal, 2025).unwrap(), vec![ndt(2025, 1, 29)]);
    }
}
