//! Relative rules: a day offset from another rule's resolved dates.

use chrono::prelude::*;
use chrono::Days;

use crate::calculators::fixed::mismatch;
use crate::calculators::{Calculator, ResolveCtx};
use crate::errors::CalendarError;
use crate::rules::{HolidayRule, RuleParams};

/// Strategy for [`RuleParams::Relative`].
///
/// The referenced rule is resolved for the same year through the context,
/// which guards against reference cycles and unbounded chains. Offsets
/// apply to the referenced rule's computed dates, before its own observance
/// shift.
#[derive(Debug, Copy, Clone, Default)]
pub struct RelativeCalculator;

impl Calculator for RelativeCalculator {
    fn dates(
        &self,
        rule: &HolidayRule,
        year: i32,
        ctx: &ResolveCtx,
    ) -> Result<Vec<NaiveDateTime>, CalendarError> {
        let RuleParams::Relative { rule_id, days } = &rule.params else {
            return Err(mismatch(rule));
        };
        let base = ctx.resolve_reference(rule, rule_id, year)?;
        let offset = Days::new(u64::from(days.unsigned_abs()));
        Ok(base
            .into_iter()
            .map(|d| if *days < 0 { d - offset } else { d + offset })
            .collect())
    }
}
