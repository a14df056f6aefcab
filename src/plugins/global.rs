//! A process-wide default registry behind free functions.
//!
//! Most applications want a single shared registry they can install locale
//! packs into once and query from anywhere. These wrappers lock the shared
//! instance per call; embedders needing finer control construct their own
//! [`CapabilityRegistry`].

use std::sync::{LazyLock, RwLock};

use chrono::NaiveDateTime;

use crate::errors::CalendarError;
use crate::plugins::{CapabilityRegistry, PluginDescriptor};
use crate::rules::{HolidayOccurrence, HolidayRule};

static DEFAULT_REGISTRY: LazyLock<RwLock<CapabilityRegistry>> =
    LazyLock::new(|| RwLock::new(CapabilityRegistry::new()));

fn with_registry<T>(f: impl FnOnce(&mut CapabilityRegistry) -> T) -> T {
    let mut guard = DEFAULT_REGISTRY
        .write()
        .expect("default registry lock poisoned");
    f(&mut guard)
}

/// Run `f` against the process-wide registry.
///
/// The lock is held for the duration of the call.
pub fn default_registry<T>(f: impl FnOnce(&mut CapabilityRegistry) -> T) -> T {
    with_registry(f)
}

/// Install plugins into the process-wide registry.
pub fn install(batch: Vec<PluginDescriptor>) -> Result<(), CalendarError> {
    with_registry(|registry| registry.install(batch))
}

/// Register a holiday rule on the process-wide engine.
pub fn register_rule(rule: HolidayRule) -> Result<(), CalendarError> {
    with_registry(|registry| registry.engine().register_rule(rule))
}

/// Set the default locale of the process-wide engine.
pub fn set_locale(locale: &str) -> Result<(), CalendarError> {
    with_registry(|registry| registry.engine().set_locale(locale))
}

/// Resolve a year's holidays from the process-wide engine.
pub fn get_holidays(year: i32, locale: &str) -> Result<Vec<HolidayOccurrence>, CalendarError> {
    with_registry(|registry| registry.engine().resolve(year, locale))
}

/// Whether `date` is a holiday in `locale`, per the process-wide engine.
pub fn is_holiday(date: &NaiveDateTime, locale: &str) -> Result<bool, CalendarError> {
    with_registry(|registry| registry.engine().is_holiday(date, locale))
}

/// Restore the process-wide registry to its pristine state.
pub fn reset_all() {
    with_registry(|registry| registry.reset_all());
}
