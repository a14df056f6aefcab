//! South Korean public holidays.

use crate::plugins::PluginDescriptor;
use crate::rules::{HolidayRule, RuleParams};

/// The `kr` locale pack.
///
/// Seollal and Chuseok are three-day observances centred on a lunisolar
/// date; the flanking days are expressed as offsets from the centre rule.
/// Substitute-holiday legislation is not modelled.
pub fn kr_pack() -> PluginDescriptor {
    PluginDescriptor::new("kr-holidays", &["calculators"], |ctx| {
        ctx.register_rule(HolidayRule::new(
            "kr-new-year",
            "New Year's Day",
            "kr",
            RuleParams::Fixed { month: 1, day: 1 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-seollal",
            "Seollal",
            "kr",
            RuleParams::Lunar { month: 1, day: 1, leap: false },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-seollal-eve",
            "Seollal Holiday",
            "kr",
            RuleParams::Relative {
                rule_id: "kr-seollal".to_string(),
                days: -1,
            },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-seollal-second",
            "Seollal Holiday",
            "kr",
            RuleParams::Relative {
                rule_id: "kr-seollal".to_string(),
                days: 1,
            },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-independence-movement",
            "Independence Movement Day",
            "kr",
            RuleParams::Fixed { month: 3, day: 1 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-childrens-day",
            "Children's Day",
            "kr",
            RuleParams::Fixed { month: 5, day: 5 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-buddhas-birthday",
            "Buddha's Birthday",
            "kr",
            RuleParams::Lunar { month: 4, day: 8, leap: false },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-memorial-day",
            "Memorial Day",
            "kr",
            RuleParams::Fixed { month: 6, day: 6 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-liberation-day",
            "Liberation Day",
            "kr",
            RuleParams::Fixed { month: 8, day: 15 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-chuseok",
            "Chuseok",
            "kr",
            RuleParams::Lunar { month: 8, day: 15, leap: false },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-chuseok-eve",
            "Chuseok Holiday",
            "kr",
            RuleParams::Relative {
                rule_id: "kr-chuseok".to_string(),
                days: -1,
            },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-chuseok-second",
            "Chuseok Holiday",
            "kr",
            RuleParams::Relative {
                rule_id: "kr-chuseok".to_string(),
                days: 1,
            },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-foundation-day",
            "National Foundation Day",
            "kr",
            RuleParams::Fixed { month: 10, day: 3 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-hangeul-day",
            "Hangeul Day",
            "kr",
            RuleParams::Fixed { month: 10, day: 9 },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "kr-christmas",
            "Christmas Day",
            "kr",
            RuleParams::Fixed { month: 12, day: 25 },
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

    fn fixture_registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        registry
            .install(vec![calculators_plugin(), kr_pack()])
            .unwrap();
        registry
    }

    #[test]
    fn test_seollal_block_2025() {
        // lunar new year 2025 falls on 29 January
        let mut registry = fixture_registry();
        let engine = registry.engine();
        assert!(engine.is_holiday(&ndt(2025, 1, 28), "kr").unwrap());
        assert!(engine.is_holiday(&ndt(2025, 1, 29), "kr").unwrap());
        assert!(engine.is_holiday(&ndt(2025, 1, 30), "kr").unwrap());
        assert!(!engine.is_holiday(&ndt(2025, 1, 31), "kr").unwrap());
    }

    #[test]
    fn test_chuseok_and_buddhas_birthday_2024() {
        let mut registry = fixture_registry();
        let engine = registry.engine();
        // Chuseok 2024 centres on 17 September
        assert!(engine.is_holiday(&ndt(2024, 9, 16), "kr").unwrap());
        assert!(engine.is_holiday(&ndt(2024, 9, 17), "kr").unwrap());
        assert!(engine.is_holiday(&ndt(2024, 9, 18), "kr").unwrap());
        assert!(engine.is_holiday(&ndt(2024, 5, 15), "kr").unwrap());
    }

    #[test]
    fn test_fixed_dates_2024() {
        let mut registry = fixture_registry();
        let engine = registry.engine();
        for (m, d) in [(1, 1), (3, 1), (5, 5), (6, 6), (8, 15), (10, 3), (10, 9), (12, 25)] {
            assert!(engine.is_holiday(&ndt(2024, m, d), "kr").unwrap(), "{}-{}", m, d);
        }
    }
}
