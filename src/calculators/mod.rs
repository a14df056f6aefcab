//! Calculator strategies turning `(rule, year)` into concrete dates.
//!
//! Each [`RuleKind`] is served by one [`Calculator`] registered in a
//! [`CalculatorSet`]; registering a second strategy under the same tag
//! replaces the first, which lets plugins override the defaults. Strategies
//! are stateless; anything a strategy needs beyond the rule and the year
//! (the other registered rules, for relative references) comes through the
//! [`ResolveCtx`].

mod custom;
mod easter;
mod fixed;
mod lunar;
mod nth_weekday;
mod relative;

pub use custom::CustomCalculator;
pub use easter::{easter_sunday, EasterCalculator};
pub use fixed::FixedCalculator;
pub use lunar::{lunar_new_year, lunar_to_solar, LunarCalculator};
pub use nth_weekday::NthWeekdayCalculator;
pub use relative::RelativeCalculator;

use std::cell::RefCell;
use std::sync::Arc;

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::errors::CalendarError;
use crate::rules::{HolidayRule, RuleKind};

/// Hard ceiling on relative-rule recursion.
///
/// Cycles are caught by the in-flight stack; the depth cap guarantees
/// termination even if a future strategy bypasses that bookkeeping.
pub const MAX_RELATIVE_DEPTH: usize = 16;

/// A strategy computing the dates of one rule for one year.
///
/// Implementations must be pure: same rule and year, same output.
pub trait Calculator: Send + Sync {
    /// The unadjusted dates of `rule` in `year`, possibly empty.
    fn dates(
        &self,
        rule: &HolidayRule,
        year: i32,
        ctx: &ResolveCtx,
    ) -> Result<Vec<NaiveDateTime>, CalendarError>;
}

/// Registry of calculator strategies keyed by rule kind.
#[derive(Clone, Default)]
pub struct CalculatorSet {
    strategies: IndexMap<RuleKind, Arc<dyn Calculator>>,
}

impl CalculatorSet {
    /// An empty registry; every resolution will fail until strategies are
    /// registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the six default strategies.
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(RuleKind::Fixed, Arc::new(FixedCalculator));
        set.register(RuleKind::NthWeekday, Arc::new(NthWeekdayCalculator));
        set.register(RuleKind::EasterOffset, Arc::new(EasterCalculator));
        set.register(RuleKind::Lunar, Arc::new(LunarCalculator));
        set.register(RuleKind::Relative, Arc::new(RelativeCalculator));
        set.register(RuleKind::Custom, Arc::new(CustomCalculator));
        set
    }

    /// Bind a strategy to a kind, replacing any previous binding.
    pub fn register(&mut self, kind: RuleKind, strategy: Arc<dyn Calculator>) {
        self.strategies.insert(kind, strategy);
    }

    /// The strategy bound to `kind`, if any.
    pub fn get(&self, kind: RuleKind) -> Option<&Arc<dyn Calculator>> {
        self.strategies.get(&kind)
    }

    /// The number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns whether no strategies are registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for CalculatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculatorSet")
            .field("kinds", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Per-resolution view handed to calculators: the rule registry, the
/// strategy registry and the in-flight reference stack.
pub struct ResolveCtx<'a> {
    rules: &'a IndexMap<String, HolidayRule>,
    calculators: &'a CalculatorSet,
    stack: RefCell<Vec<String>>,
}

impl<'a> ResolveCtx<'a> {
    /// Create a context over the registered rules and strategies.
    pub fn new(rules: &'a IndexMap<String, HolidayRule>, calculators: &'a CalculatorSet) -> Self {
        ResolveCtx {
            rules,
            calculators,
            stack: RefCell::new(Vec::new()),
        }
    }

    /// Dispatch `rule` to its bound strategy.
    pub fn compute(
        &self,
        rule: &HolidayRule,
        year: i32,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        let kind = rule.kind();
        let calc = self
            .calculators
            .get(kind)
            .ok_or_else(|| CalendarError::InvalidHolidayRule {
                rule: rule.id.clone(),
                reason: format!("no calculator registered for kind '{}'", kind),
            })?
            .clone();
        self.stack.borrow_mut().push(rule.id.clone());
        let result = calc.dates(rule, year, self);
        self.stack.borrow_mut().pop();
        result
    }

    /// Resolve the rule referenced by `referrer`, guarding against cycles
    /// and unbounded chains.
    pub fn resolve_reference(
        &self,
        referrer: &HolidayRule,
        target_id: &str,
        year: i32,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        if self.stack.borrow().iter().any(|id| id == target_id) {
            return Err(CalendarError::CyclicHolidayReference(target_id.to_string()));
        }
        if self.stack.borrow().len() >= MAX_RELATIVE_DEPTH {
            return Err(CalendarError::CyclicHolidayReference(referrer.id.clone()));
        }
        let target = self
            .rules
            .get(target_id)
            .ok_or_else(|| CalendarError::InvalidHolidayRule {
                rule: referrer.id.clone(),
                reason: format!("references unknown rule '{}'", target_id),
            })?;
        self.compute(target, year)
    }
}
