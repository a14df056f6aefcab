//! German nationwide public holidays.

use crate::plugins::PluginDescriptor;
use crate::rules::{HolidayRule, RuleParams};

/// The `de` locale pack.
///
/// Nationwide holidays only; state-level days (Epiphany, Corpus Christi,
/// Reformation Day and the rest) are out of scope for the bundled pack.
/// German holidays have no in-lieu convention, so every rule keeps exact
/// observance.
pub fn de_pack() -> PluginDescriptor {
    PluginDescriptor::new("de-holidays", &["calculators"], |ctx| {
        ctx.register_rule(HolidayRule::new(
            "de-new-year",
            "Neujahrstag",
            "de",
            RuleParams::Fixed { month: 1, day: 1 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-good-friday",
            "Karfreitag",
            "de",
            RuleParams::EasterOffset { days: -2 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-easter-monday",
            "Ostermontag",
            "de",
            RuleParams::EasterOffset { days: 1 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-labour-day",
            "Tag der Arbeit",
            "de",
            RuleParams::Fixed { month: 5, day: 1 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-ascension",
            "Christi Himmelfahrt",
            "de",
            RuleParams::EasterOffset { days: 39 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-whit-monday",
            "Pfingstmontag",
            "de",
            RuleParams::EasterOffset { days: 50 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-unity-day",
            "Tag der Deutschen Einheit",
            "de",
            RuleParams::Fixed { month: 10, day: 3 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-christmas",
            "Erster Weihnachtstag",
            "de",
            RuleParams::Fixed { month: 12, day: 25 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "de-second-christmas",
            "Zweiter Weihnachtstag",
            "de",
            RuleParams::Fixed { month: 12, day: 26 },
        ))?;
        Ok(())
    })
}

// UNIT TESTS
#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::ndt;
    use crate::plugins::{calculators_plugin, CapabilityRegistry};

    #[test]
    fn test_de_2024() {
        let mut registry = CapabilityRegistry::new();
        registry
            .install(vec![calculators_plugin(), de_pack()])
            .unwrap();
        let dates: Vec<_> = registry
            .engine()
            .resolve(2024, "de")
            .unwrap()
            .into_iter()
            .map(|o| o.date)
            .collect();
        // Easter Sunday 2024 falls on 31 March
        assert_eq!(
            dates,
            vec![
                ndt(2024, 1, 1),   // Neujahrstag
                ndt(2024, 3, 29),  // Karfreitag
                ndt(2024, 4, 1),   // Ostermontag
                ndt(2024, 5, 1),   // Tag der Arbeit
                ndt(2024, 5, 9),   // Christi Himmelfahrt
                ndt(2024, 5, 20),  // Pfingstmontag
                ndt(2024, 10, 3),  // Tag der Deutschen Einheit
                ndt(2024, 12, 25), // Erster Weihnachtstag
                ndt(2024, 12, 26), // Zweiter Weihnachtstag
            ]
        );
    }
}
