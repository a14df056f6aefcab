//! United States federal holidays.

use chrono::Weekday;

use crate::plugins::PluginDescriptor;
use crate::rules::{HolidayRule, Observance, RuleParams};

/// The `us` locale pack.
///
/// Fixed-date holidays carry the federal in-lieu convention: a Saturday
/// holiday is observed the preceding Friday, a Sunday holiday the following
/// Monday.
pub fn us_pack() -> PluginDescriptor {
    PluginDescriptor::new("us-holidays", &["calculators"], |ctx| {
        ctx.register_rule(
            HolidayRule::new(
                "us-new-year",
                "New Year's Day",
                "us",
                RuleParams::Fixed { month: 1, day: 1 },
            )
            .with_observance(Observance::Nearest),
        )?;
        ctx.register_rule(HolidayRule::new(
            "us-mlk",
            "Martin Luther King Jr. Day",
            "us",
            RuleParams::NthWeekday {
                month: 1,
                weekday: Weekday::Mon,
                nth: 3,
            },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "us-memorial",
            "Memorial Day",
            "us",
            RuleParams::NthWeekday {
                month: 5,
                weekday: Weekday::Mon,
                nth: -1,
            },
        ))?;
        ctx.register_rule(
            HolidayRule::new(
                "us-independence",
                "Independence Day",
                "us",
                RuleParams::Fixed { month: 7, day: 4 },
            )
            .with_observance(Observance::Nearest),
        )?;
        ctx.register_rule(HolidayRule::new(
            "us-labor",
            "Labor Day",
            "us",
            RuleParams::NthWeekday {
                month: 9,
                weekday: Weekday::Mon,
                nth: 1,
            },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "us-thanksgiving",
            "Thanksgiving Day",
            "us",
            RuleParams::NthWeekday {
                month: 11,
                weekday: Weekday::Thu,
                nth: 4,
            },
        ))?;
        ctx.register_rule(HolidayRule::new(
            "us-day-after-thanksgiving",
            "Day After Thanksgiving",
            "us",
            RuleParams::Relative {
                rule_id: "us-thanksgiving".to_string(),
                days: 1,
            },
        ))?;
        ctx.register_rule(
            HolidayRule::new(
                "us-christmas",
                "Christmas Day",
                "us",
                RuleParams::Fixed { month: 12, day: 25 },
            )
            .with_observance(Observance::Nearest),
        )?;
        Ok(())
    })
}
