//! Declarative holiday rules and their resolved occurrences.
//!
//! A [`HolidayRule`] describes *how* a holiday's date is found for any year;
//! the engine turns it into [`HolidayOccurrence`] values, one per resolved
//! year. Rules are immutable once registered.

mod observance;

pub use observance::Observance;

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cache::memoize;
use crate::dates::{is_valid_date, is_valid_locale, is_valid_nth};
use crate::errors::CalendarError;

/// The wildcard locale scoping a rule to every locale.
pub const ALL_LOCALES: &str = "*";

/// Type tag identifying a calculator strategy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Same month and day every year.
    Fixed,
    /// The nth occurrence of a weekday within a month.
    NthWeekday,
    /// A day offset from Easter Sunday.
    EasterOffset,
    /// A lunisolar calendar month and day converted to Gregorian.
    Lunar,
    /// A day offset from another resolved rule.
    Relative,
    /// A user-supplied pure function of the year.
    Custom,
}

impl RuleKind {
    /// The kebab-case tag used in rule definitions and registries.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Fixed => "fixed",
            RuleKind::NthWeekday => "nth-weekday",
            RuleKind::EasterOffset => "easter-offset",
            RuleKind::Lunar => "lunar",
            RuleKind::Relative => "relative",
            RuleKind::Custom => "custom",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque user-supplied calculation, `year -> dates`.
///
/// Closures cannot be serialized or compared; serde skips the field (a
/// deserialized custom rule computes nothing until rebound) and equality is
/// `Arc` identity.
#[derive(Clone)]
pub struct CustomFn(Arc<dyn Fn(i32) -> Vec<NaiveDateTime> + Send + Sync>);

impl CustomFn {
    /// Wrap a pure function of the year.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(i32) -> Vec<NaiveDateTime> + Send + Sync + 'static,
    {
        CustomFn(Arc::new(f))
    }

    /// Wrap an expensive calculation in a bounded per-year cache.
    ///
    /// The callback runs once per distinct year until eviction; repeated
    /// calls return a clone of the cached result.
    pub fn memoized<F>(capacity: usize, mut f: F) -> Self
    where
        F: FnMut(i32) -> Vec<NaiveDateTime> + Send + 'static,
    {
        let cached = Mutex::new(memoize(capacity, move |year: &i32| f(*year)));
        CustomFn(Arc::new(move |year| {
            let mut memo = cached.lock().expect("memoized callback lock poisoned");
            (*memo)(year)
        }))
    }

    /// Invoke the wrapped function.
    pub fn call(&self, year: i32) -> Vec<NaiveDateTime> {
        (self.0)(year)
    }
}

impl Default for CustomFn {
    fn default() -> Self {
        CustomFn(Arc::new(|_| Vec::new()))
    }
}

impl fmt::Debug for CustomFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFn(..)")
    }
}

impl PartialEq for CustomFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Type-specific parameters of a holiday rule, one variant per [`RuleKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RuleParams {
    /// Same `month`/`day` every year, e.g. January 1.
    ///
    /// A rule for February 29 yields no occurrence in non-leap years.
    Fixed {
        /// Calendar month, 1..=12.
        month: u32,
        /// Day of the month.
        day: u32,
    },
    /// The `nth` occurrence of `weekday` in `month`; negative `nth` counts
    /// from the end of the month.
    NthWeekday {
        /// Calendar month, 1..=12.
        month: u32,
        /// Target weekday.
        weekday: Weekday,
        /// Ordinal in 1..=5 or -5..=-1.
        nth: i8,
    },
    /// `days` after Easter Sunday (negative for before), e.g. -2 for Good
    /// Friday.
    EasterOffset {
        /// Signed day offset from Easter Sunday.
        days: i32,
    },
    /// Day `day` of lunisolar `month`, converted to the Gregorian date
    /// falling in the queried year.
    Lunar {
        /// Lunar month, 1..=12.
        month: u32,
        /// Lunar day, 1..=30.
        day: u32,
        /// Pin the intercalary (leap) month rather than the regular one.
        #[serde(default)]
        leap: bool,
    },
    /// `days` after the dates of the rule registered under `rule_id`.
    Relative {
        /// The referenced rule id.
        rule_id: String,
        /// Signed day offset from each referenced date.
        days: i32,
    },
    /// Dates produced by an opaque callback.
    Custom {
        /// The user-supplied calculation.
        #[serde(skip)]
        calc: CustomFn,
    },
}

impl RuleParams {
    /// The calculator tag this parameter set dispatches to.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleParams::Fixed { .. } => RuleKind::Fixed,
            RuleParams::NthWeekday { .. } => RuleKind::NthWeekday,
            RuleParams::EasterOffset { .. } => RuleKind::EasterOffset,
            RuleParams::Lunar { .. } => RuleKind::Lunar,
            RuleParams::Relative { .. } => RuleKind::Relative,
            RuleParams::Custom { .. } => RuleKind::Custom,
        }
    }
}

/// A declarative holiday definition, immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayRule {
    /// Unique identifier, referenced by relative rules.
    pub id: String,
    /// Human-readable holiday name.
    pub name: String,
    /// Locale tag the rule belongs to, or [`ALL_LOCALES`].
    pub locale: String,
    /// The calculation parameters.
    pub params: RuleParams,
    /// Weekend-shift policy applied to each resolved date.
    #[serde(default)]
    pub observance: Observance,
}

impl HolidayRule {
    /// Create a rule observing its exact computed date.
    pub fn new(id: &str, name: &str, locale: &str, params: RuleParams) -> Self {
        HolidayRule {
            id: id.to_string(),
            name: name.to_string(),
            locale: locale.to_string(),
            params,
            observance: Observance::Exact,
        }
    }

    /// Replace the observance policy, builder style.
    pub fn with_observance(mut self, observance: Observance) -> Self {
        self.observance = observance;
        self
    }

    /// The calculator tag this rule dispatches to.
    pub fn kind(&self) -> RuleKind {
        self.params.kind()
    }
}

/// One resolved holiday date for one rule in one year. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayOccurrence {
    /// The rule that produced this occurrence.
    pub rule_id: String,
    /// The (observance-adjusted) calendar date.
    pub date: NaiveDateTime,
    /// Holiday name, copied from the rule.
    pub name: String,
    /// Locale the occurrence was resolved for.
    pub locale: String,
}

/// Validate a rule's structural constraints before registration.
///
/// Violations report the offending rule id and the constraint, never the
/// fact that some later resolution would fail.
pub fn validate_holiday_rule(rule: &HolidayRule) -> Result<(), CalendarError> {
    let fail = |reason: String| {
        Err(CalendarError::InvalidHolidayRule {
            rule: rule.id.clone(),
            reason,
        })
    };
    if rule.id.is_empty() {
        return fail("id must not be empty".into());
    }
    if rule.name.is_empty() {
        return fail("name must not be empty".into());
    }
    if !is_valid_locale(&rule.locale) {
        return fail(format!("malformed locale '{}'", rule.locale));
    }
    match &rule.params {
        RuleParams::Fixed { month, day } => {
            // validated against a leap year; Feb 29 is a legitimate rule
            if !is_valid_date(2000, *month, *day) {
                return fail(format!("no month/day {:02}-{:02}", month, day));
            }
        }
        RuleParams::NthWeekday { month, nth, .. } => {
            if !(1..=12).contains(month) {
                return fail(format!("month {} out of range", month));
            }
            if !is_valid_nth(*nth) {
                return fail(format!("nth {} out of range", nth));
            }
        }
        RuleParams::EasterOffset { days } => {
            if !(-366..=366).contains(days) {
                return fail(format!("easter offset {} out of range", days));
            }
        }
        RuleParams::Lunar { month, day, .. } => {
            if !(1..=12).contains(month) || !(1..=30).contains(day) {
                return fail(format!("no lunar month/day {:02}-{:02}", month, day));
            }
        }
        RuleParams::Relative { rule_id, days } => {
            if rule_id.is_empty() {
                return fail("relative rule must reference a rule id".into());
            }
            if *rule_id == rule.id {
                return fail("relative rule must not reference itself".into());
            }
            if !(-366..=366).contains(days) {
                return fail(format!("relative offset {} out of range", days));
            }
        }
        RuleParams::Custom { .. } => {}
    }
    Ok(())
}

// UNIT TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::ndt;

    fn fixture_fixed() -> HolidayRule {
        HolidayRule::new(
            "new-year",
            "New Year's Day",
            "us",
            RuleParams::Fixed { month: 1, day: 1 },
        )
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(fixture_fixed().kind().as_str(), "fixed");
        assert_eq!(RuleKind::NthWeekday.to_string(), "nth-weekday");
        assert_eq!(RuleKind::EasterOffset.as_str(), "easter-offset");
    }

    #[test]
    fn test_validate_ok() {
        assert!(validate_holiday_rule(&fixture_fixed()).is_ok());

        let rule = HolidayRule::new(
            "mlk",
            "Martin Luther King Jr. Day",
            "us",
            RuleParams::NthWeekday {
                month: 1,
                weekday: Weekday::Mon,
                nth: 3,
            },
        );
        assert!(validate_holiday_rule(&rule).is_ok());

        // leap day is a legal fixed rule
        let rule = HolidayRule::new(
            "leap",
            "Leap Day",
            "*",
            RuleParams::Fixed { month: 2, day: 29 },
        );
        assert!(validate_holiday_rule(&rule).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let rule = HolidayRule::new(
            "bad",
            "Bad",
            "us",
            RuleParams::Fixed { month: 13, day: 1 },
        );
        assert!(matches!(
            validate_holiday_rule(&rule),
            Err(CalendarError::InvalidHolidayRule { .. })
        ));

        let rule = HolidayRule::new(
            "bad",
            "Bad",
            "us",
            RuleParams::NthWeekday {
                month: 11,
                weekday: Weekday::Thu,
                nth: 0,
            },
        );
        assert!(validate_holiday_rule(&rule).is_err());
    }

    #[test]
    fn test_validate_rejects_self_reference() {
        let rule = HolidayRule::new(
            "loop",
            "Loop",
            "us",
            RuleParams::Relative {
                rule_id: "loop".to_string(),
                days: 1,
            },
        );
        let err = validate_holiday_rule(&rule).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidHolidayRule { .. }));
        assert!(err.to_string().contains("reference itself"));
    }

    #[test]
    fn test_validate_rejects_malformed_locale() {
        let mut rule = fixture_fixed();
        rule.locale = "US ".to_string();
        assert!(validate_holiday_rule(&rule).is_err());
    }

    #[test]
    fn test_memoized_custom_callback_runs_once_per_year() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let f = CustomFn::memoized(4, move |y| {
            counter.fetch_add(1, Ordering::SeqCst);
            vec![ndt(y, 6, 1)]
        });
        assert_eq!(f.call(2024), vec![ndt(2024, 6, 1)]);
        assert_eq!(f.call(2024), vec![ndt(2024, 6, 1)]);
        assert_eq!(f.call(2025), vec![ndt(2025, 6, 1)]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_custom_fn_identity_eq() {
        let a = CustomFn::new(|y| vec![ndt(y, 7, 1)]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, CustomFn::new(|y| vec![ndt(y, 7, 1)]));
        assert_eq!(a.call(2024), vec![ndt(2024, 7, 1)]);
        assert!(CustomFn::default().call(2024).is_empty());
    }
}
