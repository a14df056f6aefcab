//! The holiday engine: rule registration, resolution and caching.
//!
//! The engine owns a [`CalculatorSet`], the registered [`HolidayRule`]s and
//! an LRU cache of per-`(locale, year)` resolutions. Registration is
//! expected to happen at startup; queries afterwards are served from cache
//! whenever possible.
//!
//! # Example
//! ```rust
//! use feriae::engine::HolidayEngine;
//! use feriae::rules::{HolidayRule, RuleParams};
//! use feriae::dates::ndt;
//!
//! let mut engine = HolidayEngine::new();
//! engine
//!     .register_rule(HolidayRule::new(
//!         "new-year",
//!         "New Year's Day",
//!         "us",
//!         RuleParams::Fixed { month: 1, day: 1 },
//!     ))
//!     .unwrap();
//! assert!(engine.is_holiday(&ndt(2024, 1, 1), "us").unwrap());
//! assert!(!engine.is_holiday(&ndt(2024, 1, 2), "us").unwrap());
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::prelude::*;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::cache::LruCache;
use crate::calculators::{Calculator, CalculatorSet, ResolveCtx};
use crate::dates::{is_valid_locale, is_valid_year};
use crate::errors::CalendarError;
use crate::rules::{validate_holiday_rule, HolidayOccurrence, HolidayRule, RuleKind, ALL_LOCALES};

/// Resolves declarative holiday rules into dated occurrences per locale.
#[derive(Debug)]
pub struct HolidayEngine {
    calculators: CalculatorSet,
    rules: IndexMap<String, HolidayRule>,
    cache: LruCache<(String, i32), Vec<HolidayOccurrence>>,
    date_cache: LruCache<(String, NaiveDate), bool>,
    weekends: HashMap<String, HashSet<Weekday>>,
    default_locale: String,
}

impl Default for HolidayEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HolidayEngine {
    /// An engine with the six default calculator strategies bound.
    pub fn new() -> Self {
        Self::with_calculators(CalculatorSet::with_defaults())
    }

    /// An engine with a caller-supplied strategy registry.
    ///
    /// The plugin system starts from an empty registry and lets the
    /// `calculators` plugin populate it.
    pub fn with_calculators(calculators: CalculatorSet) -> Self {
        HolidayEngine {
            calculators,
            rules: IndexMap::new(),
            cache: LruCache::holiday_cache(),
            date_cache: LruCache::date_cache(),
            weekends: HashMap::new(),
            default_locale: ALL_LOCALES.to_string(),
        }
    }

    /// Bind a calculator strategy to a rule kind; last write wins.
    ///
    /// Rebinding invalidates cached results for the locales whose rules
    /// dispatch to the replaced strategy. Relative rules can reach any
    /// kind through their reference chain, so their locales are
    /// invalidated as well.
    pub fn register_calculator(&mut self, kind: RuleKind, strategy: Arc<dyn Calculator>) {
        self.calculators.register(kind, strategy);
        let affected: HashSet<String> = self
            .rules
            .values()
            .filter(|r| r.kind() == kind || r.kind() == RuleKind::Relative)
            .map(|r| r.locale.clone())
            .collect();
        if affected.contains(ALL_LOCALES) {
            self.cache.clear();
            self.date_cache.clear();
        } else {
            self.cache.retain(|(l, _), _| !affected.contains(l));
            self.date_cache.retain(|(l, _), _| !affected.contains(l));
        }
    }

    /// Register a holiday rule after validating it.
    ///
    /// Cached resolutions of the rule's locale are invalidated; other
    /// locales keep their cache entries. A wildcard rule invalidates all.
    pub fn register_rule(&mut self, rule: HolidayRule) -> Result<(), CalendarError> {
        validate_holiday_rule(&rule)?;
        if self.rules.contains_key(&rule.id) {
            return Err(CalendarError::InvalidHolidayRule {
                rule: rule.id,
                reason: "duplicate rule id".to_string(),
            });
        }
        if rule.locale == ALL_LOCALES {
            self.cache.clear();
            self.date_cache.clear();
        } else {
            let locale = rule.locale.clone();
            self.cache.retain(|(l, _), _| *l != locale);
            self.date_cache.retain(|(l, _), _| *l != locale);
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Returns whether a rule id is registered.
    pub fn contains_rule(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    /// Override the weekend mask used for observance shifts in `locale`.
    ///
    /// Unconfigured locales use Saturday/Sunday.
    pub fn set_weekend(&mut self, locale: &str, weekend: HashSet<Weekday>) {
        self.weekends.insert(locale.to_string(), weekend);
        let locale = locale.to_string();
        self.cache.retain(|(l, _), _| *l != locale);
        self.date_cache.retain(|(l, _), _| *l != locale);
    }

    /// Set the locale used by queries that omit one.
    pub fn set_locale(&mut self, locale: &str) -> Result<(), CalendarError> {
        if !is_valid_locale(locale) {
            return Err(CalendarError::UnknownLocale(locale.to_string()));
        }
        self.default_locale = locale.to_string();
        Ok(())
    }

    /// The locale used by queries that omit one.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// The number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn weekend_for(&self, locale: &str) -> HashSet<Weekday> {
        self.weekends
            .get(locale)
            .cloned()
            .unwrap_or_else(|| HashSet::from([Weekday::Sat, Weekday::Sun]))
    }

    /// Resolve every rule of `locale` (plus wildcard rules) for `year`.
    ///
    /// Occurrences are ordered by date ascending, ties broken by rule
    /// registration order. A well-formed locale with no rules resolves to
    /// an empty vector; "no holidays configured" is a valid state.
    pub fn resolve(
        &mut self,
        year: i32,
        locale: &str,
    ) -> Result<Vec<HolidayOccurrence>, CalendarError> {
        if !is_valid_year(year) {
            return Err(CalendarError::InvalidDate(format!(
                "year {} is outside the supported range",
                year
            )));
        }
        if !is_valid_locale(locale) {
            return Err(CalendarError::UnknownLocale(locale.to_string()));
        }
        let key = (locale.to_string(), year);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let weekend = self.weekend_for(locale);
        let ctx = ResolveCtx::new(&self.rules, &self.calculators);
        let mut staged: Vec<(NaiveDateTime, usize, &HolidayRule)> = Vec::new();
        for (seq, rule) in self.rules.values().enumerate() {
            if rule.locale != locale && rule.locale != ALL_LOCALES {
                continue;
            }
            for date in ctx.compute(rule, year)? {
                staged.push((rule.observance.observed(&date, &weekend), seq, rule));
            }
        }
        let occurrences: Vec<HolidayOccurrence> = staged
            .into_iter()
            .sorted_by_key(|(date, seq, _)| (*date, *seq))
            .map(|(date, _, rule)| HolidayOccurrence {
                rule_id: rule.id.clone(),
                date,
                name: rule.name.clone(),
                locale: locale.to_string(),
            })
            .collect();

        self.cache.insert(key, occurrences.clone());
        Ok(occurrences)
    }

    /// Resolve for the default locale.
    pub fn holidays(&mut self, year: i32) -> Result<Vec<HolidayOccurrence>, CalendarError> {
        let locale = self.default_locale.clone();
        self.resolve(year, &locale)
    }

    /// Whether `date` is a holiday in `locale`, by calendar-date membership.
    ///
    /// Lookups are memoized in a bounded per-date cache, invalidated
    /// together with the locale's cached resolutions.
    pub fn is_holiday(
        &mut self,
        date: &NaiveDateTime,
        locale: &str,
    ) -> Result<bool, CalendarError> {
        let key = (locale.to_string(), date.date());
        if let Some(hit) = self.date_cache.get(&key) {
            return Ok(*hit);
        }
        let occurrences = self.resolve(date.year(), locale)?;
        let hit = occurrences.iter().any(|o| o.date.date() == date.date());
        self.date_cache.insert(key, hit);
        Ok(hit)
    }

    /// [`Self::is_holiday`] against the default locale.
    pub fn observes(&mut self, date: &NaiveDateTime) -> Result<bool, CalendarError> {
        let locale = self.default_locale.clone();
        self.is_holiday(date, &locale)
    }
}
