//! Error types shared across the crate, with the ``thiserror`` crate.

use thiserror::Error;

/// Any failure raised by plugin installation, rule registration or holiday
/// resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// A plugin depends on another that is neither installed nor in its
    /// batch.
    #[error("plugin '{plugin}' depends on '{dependency}', which is not installed")]
    MissingDependency { plugin: String, dependency: String },

    /// A plugin batch contains a dependency cycle through the named plugin.
    #[error("plugin dependency cycle through '{0}'")]
    CyclicDependency(String),

    /// A plugin name is already installed with a different definition.
    #[error("plugin '{0}' is already installed with a different definition")]
    PluginConflict(String),

    /// Two plugins attach a capability under the same name.
    #[error("capability '{name}' attached by both '{first}' and '{second}'")]
    CapabilityConflict {
        name: String,
        first: String,
        second: String,
    },

    /// A holiday rule failed validation at registration.
    #[error("invalid holiday rule '{rule}': {reason}")]
    InvalidHolidayRule { rule: String, reason: String },

    /// Relative rules form a reference cycle through the named rule.
    #[error("holiday rule reference cycle through '{0}'")]
    CyclicHolidayReference(String),

    /// A calculator produced output violating its contract.
    #[error("calculator output for rule '{rule}' is invalid: {reason}")]
    InvalidCalculatorOutput { rule: String, reason: String },

    /// An invoked capability name is not attached.
    #[error("unknown capability '{0}'")]
    UnknownCapability(String),

    /// A locale tag is malformed.
    #[error("unknown locale '{0}'")]
    UnknownLocale(String),

    /// A date or year outside the supported range, or one that does not
    /// exist on the calendar.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}
