//! This is the documentation for feriae
//!
//! An extensible holiday and calendar computation library. Declarative
//! [`rules`](crate::rules) describe *when* a holiday falls; pluggable
//! [`calculators`](crate::calculators) turn a rule and a year into concrete
//! dates; the [`engine`](crate::engine) resolves, adjusts for observance
//! and caches per locale; and the [`plugins`](crate::plugins) layer lets
//! independently authored packs compose onto one shared registry without
//! touching the date core.
//!
//! ```rust
//! use feriae::dates::ndt;
//! use feriae::locales::us_pack;
//! use feriae::plugins::{calculators_plugin, CapabilityRegistry};
//!
//! let mut registry = CapabilityRegistry::new();
//! registry.install(vec![calculators_plugin(), us_pack()]).unwrap();
//! let engine = registry.engine();
//! assert!(engine.is_holiday(&ndt(2024, 11, 28), "us").unwrap());
//! ```

pub mod json;

pub mod errors;

pub mod dates;

pub mod cache;

pub mod rules;

pub mod calculators;

pub mod engine;

pub mod plugins;

pub mod locales;
