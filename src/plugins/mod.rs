//! Capability composition: independent modules extending the shared engine.
//!
//! A [`PluginDescriptor`] names a module, its dependencies and an install
//! callback. [`CapabilityRegistry::install`] orders a batch topologically,
//! verifies dependencies and runs each callback against an [`InstallCtx`]
//! which stages its effects; a failing callback leaves the registry exactly
//! as it was (atomic per plugin).
//!
//! Rather than mutating a shared date type, plugins attach *named
//! capabilities*: functions over the engine and a date value, invoked
//! through [`CapabilityRegistry::invoke`]. The date core itself (`chrono`)
//! stays untouched.

mod global;

pub use global::{
    default_registry, get_holidays, install, is_holiday, register_rule, reset_all, set_locale,
};

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use indexmap::{IndexMap, IndexSet};

use crate::calculators::{Calculator, CalculatorSet};
use crate::engine::HolidayEngine;
use crate::errors::CalendarError;
use crate::rules::{validate_holiday_rule, HolidayOccurrence, HolidayRule, RuleKind};

/// A value produced by an attached capability.
#[derive(Debug, Clone, PartialEq)]
pub enum CapValue {
    /// A yes/no answer, e.g. "is this date a holiday".
    Bool(bool),
    /// A single date.
    Date(NaiveDateTime),
    /// A list of dates.
    Dates(Vec<NaiveDateTime>),
    /// Resolved holiday occurrences.
    Occurrences(Vec<HolidayOccurrence>),
    /// Free-form text, e.g. a holiday name.
    Text(String),
}

/// A named function a plugin attaches to the date abstraction.
pub type CapabilityFn =
    Arc<dyn Fn(&mut HolidayEngine, &NaiveDateTime) -> Result<CapValue, CalendarError> + Send + Sync>;

type InstallFn = Arc<dyn Fn(&mut InstallCtx) -> Result<(), CalendarError> + Send + Sync>;

/// An independently authored module extending the registry.
#[derive(Clone)]
pub struct PluginDescriptor {
    name: String,
    dependencies: Vec<String>,
    install: InstallFn,
}

impl PluginDescriptor {
    /// Define a plugin. `dependencies` name plugins that must be installed
    /// first (or alongside, in the same batch).
    pub fn new<F>(name: &str, dependencies: &[&str], install: F) -> Self
    where
        F: Fn(&mut InstallCtx) -> Result<(), CalendarError> + Send + Sync + 'static,
    {
        PluginDescriptor {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            install: Arc::new(install),
        }
    }

    /// The unique plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of plugins this one depends on.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

struct BoundCapability {
    plugin: String,
    func: CapabilityFn,
}

/// Staged view handed to a plugin's install callback.
///
/// Effects are buffered and committed only if the whole callback succeeds.
pub struct InstallCtx<'a> {
    registry: &'a CapabilityRegistry,
    plugin: String,
    capabilities: IndexMap<String, CapabilityFn>,
    calculators: Vec<(RuleKind, Arc<dyn Calculator>)>,
    rules: Vec<HolidayRule>,
}

impl InstallCtx<'_> {
    /// Attach a named capability to the date abstraction.
    ///
    /// Names must be unique across all installed plugins.
    pub fn attach<F>(&mut self, name: &str, func: F) -> Result<(), CalendarError>
    where
        F: Fn(&mut HolidayEngine, &NaiveDateTime) -> Result<CapValue, CalendarError>
            + Send
            + Sync
            + 'static,
    {
        let owner = self
            .registry
            .capabilities
            .get(name)
            .map(|bound| bound.plugin.clone())
            .or_else(|| self.capabilities.contains_key(name).then(|| self.plugin.clone()));
        if let Some(first) = owner {
            return Err(CalendarError::CapabilityConflict {
                name: name.to_string(),
                first,
                second: self.plugin.clone(),
            });
        }
        self.capabilities.insert(name.to_string(), Arc::new(func));
        Ok(())
    }

    /// Bind a calculator strategy on commit; last write wins.
    pub fn register_calculator(&mut self, kind: RuleKind, strategy: Arc<dyn Calculator>) {
        self.calculators.push((kind, strategy));
    }

    /// Register a holiday rule on commit.
    ///
    /// Validation runs immediately so a bad rule fails its plugin's
    /// installation before any effect is committed; that includes an id
    /// colliding with an already-registered rule or with one staged
    /// earlier by the same plugin.
    pub fn register_rule(&mut self, rule: HolidayRule) -> Result<(), CalendarError> {
        validate_holiday_rule(&rule)?;
        if self.registry.engine.contains_rule(&rule.id)
            || self.rules.iter().any(|staged| staged.id == rule.id)
        {
            return Err(CalendarError::InvalidHolidayRule {
                rule: rule.id,
                reason: "duplicate rule id".to_string(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }
}

/// Owns the installed plugin set, the capability table and the engine.
///
/// Constructible directly for embedders and tests; a process-wide default
/// instance is available through the free functions of this module.
pub struct CapabilityRegistry {
    installed: IndexMap<String, Vec<String>>,
    capabilities: IndexMap<String, BoundCapability>,
    engine: HolidayEngine,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// An empty registry around an engine with no calculators.
    ///
    /// The [`calculators_plugin`] provides the six default strategies.
    pub fn new() -> Self {
        CapabilityRegistry {
            installed: IndexMap::new(),
            capabilities: IndexMap::new(),
            engine: HolidayEngine::with_calculators(CalculatorSet::new()),
        }
    }

    /// Install a batch of plugins in dependency order.
    ///
    /// The declared order need not satisfy the dependency graph: the batch
    /// is reordered by topological sort. A cycle is `CyclicDependency`; a
    /// dependency satisfied by neither the registry nor the batch is
    /// `MissingDependency`. Re-installing an identical descriptor is a
    /// no-op; a differing descriptor under an installed name is
    /// `PluginConflict`.
    pub fn install(&mut self, batch: Vec<PluginDescriptor>) -> Result<(), CalendarError> {
        for descriptor in self.order_batch(batch)? {
            self.install_one(descriptor)?;
        }
        Ok(())
    }

    /// Topologically order `batch`, verifying every dependency.
    fn order_batch(
        &self,
        batch: Vec<PluginDescriptor>,
    ) -> Result<Vec<PluginDescriptor>, CalendarError> {
        let in_batch: IndexSet<String> = batch.iter().map(|d| d.name.clone()).collect();
        for descriptor in &batch {
            for dep in &descriptor.dependencies {
                if !self.installed.contains_key(dep) && !in_batch.contains(dep) {
                    return Err(CalendarError::MissingDependency {
                        plugin: descriptor.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        // Kahn's algorithm over batch-internal edges, preserving declared
        // order among ready plugins
        let mut remaining: IndexMap<String, PluginDescriptor> =
            batch.into_iter().map(|d| (d.name.clone(), d)).collect();
        let mut ordered = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let ready = remaining
                .values()
                .find(|d| {
                    d.dependencies
                        .iter()
                        .all(|dep| !remaining.contains_key(dep))
                })
                .map(|d| d.name.clone());
            match ready {
                Some(name) => ordered.push(remaining.shift_remove(&name).unwrap()),
                // every remaining plugin waits on another remaining one
                None => {
                    let name = remaining.keys().next().unwrap().clone();
                    return Err(CalendarError::CyclicDependency(name));
                }
            }
        }
        Ok(ordered)
    }

    fn install_one(&mut self, descriptor: PluginDescriptor) -> Result<(), CalendarError> {
        if let Some(existing_deps) = self.installed.get(&descriptor.name) {
            if *existing_deps == descriptor.dependencies {
                return Ok(()); // idempotent re-install
            }
            return Err(CalendarError::PluginConflict(descriptor.name));
        }
        let mut ctx = InstallCtx {
            registry: self,
            plugin: descriptor.name.clone(),
            capabilities: IndexMap::new(),
            calculators: Vec::new(),
            rules: Vec::new(),
        };
        (descriptor.install)(&mut ctx)?;
        let InstallCtx {
            capabilities,
            calculators,
            rules,
            ..
        } = ctx;

        // commit staged effects
        for (kind, strategy) in calculators {
            self.engine.register_calculator(kind, strategy);
        }
        for rule in rules {
            self.engine.register_rule(rule)?;
        }
        for (name, func) in capabilities {
            self.capabilities.insert(
                name,
                BoundCapability {
                    plugin: descriptor.name.clone(),
                    func,
                },
            );
        }
        self.installed
            .insert(descriptor.name, descriptor.dependencies);
        Ok(())
    }

    /// Returns whether a plugin name is installed.
    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains_key(name)
    }

    /// Names of installed plugins, in installation order.
    pub fn installed(&self) -> Vec<String> {
        self.installed.keys().cloned().collect()
    }

    /// Names of attached capabilities, in attachment order.
    pub fn capabilities(&self) -> Vec<String> {
        self.capabilities.keys().cloned().collect()
    }

    /// Invoke an attached capability for `date`.
    pub fn invoke(
        &mut self,
        capability: &str,
        date: &NaiveDateTime,
    ) -> Result<CapValue, CalendarError> {
        let func = self
            .capabilities
            .get(capability)
            .map(|bound| bound.func.clone())
            .ok_or_else(|| CalendarError::UnknownCapability(capability.to_string()))?;
        func(&mut self.engine, date)
    }

    /// The engine the capabilities operate on.
    pub fn engine(&mut self) -> &mut HolidayEngine {
        &mut self.engine
    }

    /// Clear installed plugins, capabilities and the engine. Test isolation.
    pub fn reset_all(&mut self) {
        *self = Self::new();
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("installed", &self.installed.keys().collect::<Vec<_>>())
            .field("capabilities", &self.capabilities.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The plugin registering the six default calculator strategies and the
/// base query capabilities (`is_holiday`, `holidays`).
pub fn calculators_plugin() -> PluginDescriptor {
    PluginDescriptor::new("calculators", &[], |ctx| {
        use crate::calculators::{
            CustomCalculator, EasterCalculator, FixedCalculator, LunarCalculator,
            NthWeekdayCalculator, RelativeCalculator,
        };
        ctx.register_calculator(RuleKind::Fixed, Arc::new(FixedCalculator));
        ctx.register_calculator(RuleKind::NthWeekday, Arc::new(NthWeekdayCalculator));
        ctx.register_calculator(RuleKind::EasterOffset, Arc::new(EasterCalculator));
        ctx.register_calculator(RuleKind::Lunar, Arc::new(LunarCalculator));
        ctx.register_calculator(RuleKind::Relative, Arc::new(RelativeCalculator));
        ctx.register_calculator(RuleKind::Custom, Arc::new(CustomCalculator));
        ctx.attach("is_holiday", |engine, date| {
            let locale = engine.default_locale().to_string();
            engine.is_holiday(date, &locale).map(CapValue::Bool)
        })?;
        ctx.attach("holidays", |engine, date| {
            use chrono::Datelike;
            let locale = engine.default_locale().to_string();
            engine
                .resolve(date.year(), &locale)
                .map(CapValue::Occurrences)
        })?;
        Ok(())
    })
}

// UNIT TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::ndt;
    use crate::rules::RuleParams;

    fn noop_plugin(name: &str, deps: &[&str]) -> PluginDescriptor {
        PluginDescriptor::new(name, deps, |_| Ok(()))
    }

    #[test]
    fn test_install_and_invoke() {
        let mut registry = CapabilityRegistry::new();
        let pack = PluginDescriptor::new("pack", &["calculators"], |ctx| {
            ctx.register_rule(HolidayRule::new(
                "new-year",
                "New Year's Day",
                "*",
                RuleParams::Fixed { month: 1, day: 1 },
            ))
        });
        registry.install(vec![calculators_plugin(), pack]).unwrap();

        assert!(registry.is_installed("calculators"));
        assert!(registry.is_installed("pack"));
        assert_eq!(
            registry.invoke("is_holiday", &ndt(2024, 1, 1)).unwrap(),
            CapValue::Bool(true)
        );
        assert_eq!(
            registry.invoke("is_holiday", &ndt(2024, 1, 2)).unwrap(),
            CapValue::Bool(false)
        );
    }

    #[test]
    fn test_batch_reordered_topologically() {
        // declared order violates dependencies; install reorders
        let mut registry = CapabilityRegistry::new();
        let batch = vec![
            noop_plugin("c", &["b"]),
            noop_plugin("b", &["a"]),
            noop_plugin("a", &[]),
        ];
        registry.install(batch).unwrap();
        assert_eq!(registry.installed(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_dependency_fails_before_side_effects() {
        let mut registry = CapabilityRegistry::new();
        let batch = vec![
            noop_plugin("a", &[]),
            noop_plugin("b", &["ghost"]),
        ];
        let err = registry.install(batch).unwrap_err();
        assert_eq!(
            err,
            CalendarError::MissingDependency {
                plugin: "b".to_string(),
                dependency: "ghost".to_string(),
            }
        );
        // ordering failed up front, so nothing installed at all
        assert!(registry.installed().is_empty());
    }

    #[test]
    fn test_dependency_satisfied_by_prior_install() {
        let mut registry = CapabilityRegistry::new();
        registry.install(vec![noop_plugin("a", &[])]).unwrap();
        registry.install(vec![noop_plugin("b", &["a"])]).unwrap();
        assert!(registry.is_installed("b"));
    }

    #[test]
    fn test_cyclic_dependency_detected() {
        let mut registry = CapabilityRegistry::new();
        let batch = vec![noop_plugin("a", &["b"]), noop_plugin("b", &["a"])];
        assert!(matches!(
            registry.install(batch),
            Err(CalendarError::CyclicDependency(_))
        ));
    }

    #[test]
    fn test_reinstall_is_idempotent() {
        let mut registry = CapabilityRegistry::new();
        registry.install(vec![calculators_plugin()]).unwrap();
        let caps = registry.capabilities();
        registry.install(vec![calculators_plugin()]).unwrap();
        assert_eq!(registry.capabilities(), caps);
    }

    #[test]
    fn test_same_name_different_definition_conflicts() {
        let mut registry = CapabilityRegistry::new();
        registry.install(vec![noop_plugin("a", &[])]).unwrap();
        registry.install(vec![noop_plugin("b", &[])]).unwrap();
        let err = registry
            .install(vec![noop_plugin("a", &["b"])])
            .unwrap_err();
        assert_eq!(err, CalendarError::PluginConflict("a".to_string()));
    }

    #[test]
    fn test_capability_conflict_names_both_plugins() {
        let mut registry = CapabilityRegistry::new();
        let first = PluginDescriptor::new("first", &[], |ctx| {
            ctx.attach("shadow", |_, _| Ok(CapValue::Bool(true)))
        });
        let second = PluginDescriptor::new("second", &[], |ctx| {
            ctx.attach("shadow", |_, _| Ok(CapValue::Bool(false)))
        });
        registry.install(vec![first]).unwrap();
        let err = registry.install(vec![second]).unwrap_err();
        assert_eq!(
            err,
            CalendarError::CapabilityConflict {
                name: "shadow".to_string(),
                first: "first".to_string(),
                second: "second".to_string(),
            }
        );
        // the failing plugin left nothing behind
        assert!(!registry.is_installed("second"));
        assert_eq!(
            registry.invoke("shadow", &ndt(2024, 1, 1)).unwrap(),
            CapValue::Bool(true)
        );
    }

    #[test]
    fn test_colliding_rule_id_leaves_no_partial_state() {
        let mut registry = CapabilityRegistry::new();
        let first = PluginDescriptor::new("first", &[], |ctx| {
            ctx.register_rule(HolidayRule::new(
                "shared-id",
                "First",
                "us",
                RuleParams::Fixed { month: 7, day: 1 },
            ))
        });
        registry.install(vec![first]).unwrap();
        assert_eq!(registry.engine().rule_count(), 1);

        // a fresh rule staged before the collision must not leak through
        let second = PluginDescriptor::new("second", &[], |ctx| {
            ctx.register_rule(HolidayRule::new(
                "second-fresh",
                "Fresh",
                "us",
                RuleParams::Fixed { month: 8, day: 1 },
            ))?;
            ctx.register_rule(HolidayRule::new(
                "shared-id",
                "Second",
                "us",
                RuleParams::Fixed { month: 9, day: 1 },
            ))
        });
        let err = registry.install(vec![second]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
        assert!(!registry.is_installed("second"));
        assert_eq!(registry.engine().rule_count(), 1);
    }

    #[test]
    fn test_duplicate_rule_within_one_plugin_rejected() {
        let mut registry = CapabilityRegistry::new();
        let twice = PluginDescriptor::new("twice", &[], |ctx| {
            ctx.register_rule(HolidayRule::new(
                "echo",
                "Echo",
                "us",
                RuleParams::Fixed { month: 3, day: 1 },
            ))?;
            ctx.register_rule(HolidayRule::new(
                "echo",
                "Echo Again",
                "us",
                RuleParams::Fixed { month: 4, day: 1 },
            ))
        });
        assert!(matches!(
            registry.install(vec![twice]),
            Err(CalendarError::InvalidHolidayRule { .. })
        ));
        assert!(!registry.is_installed("twice"));
        assert_eq!(registry.engine().rule_count(), 0);
    }

    #[test]
    fn test_failing_install_is_atomic() {
        let mut registry = CapabilityRegistry::new();
        let broken = PluginDescriptor::new("broken", &[], |ctx| {
            ctx.attach("partial", |_, _| Ok(CapValue::Bool(true)))?;
            Err(CalendarError::InvalidHolidayRule {
                rule: "x".to_string(),
                reason: "fixture failure".to_string(),
            })
        });
        assert!(registry.install(vec![broken]).is_err());
        assert!(!registry.is_installed("broken"));
        assert!(matches!(
            registry.invoke("partial", &ndt(2024, 1, 1)),
            Err(CalendarError::UnknownCapability(_))
        ));
    }

    #[test]
    fn test_unknown_capability() {
        let mut registry = CapabilityRegistry::new();
        assert!(matches!(
            registry.invoke("nope", &ndt(2024, 1, 1)),
            Err(CalendarError::UnknownCapability(_))
        ));
    }

    #[test]
    fn test_reset_all() {
        let mut registry = CapabilityRegistry::new();
        registry.install(vec![calculators_plugin()]).unwrap();
        registry.reset_all();
        assert!(registry.installed().is_empty());
        assert!(registry.capabilities().is_empty());
    }
}
