//! Bundled locale packs: holiday rule sets shipped as plugins.
//!
//! Each pack is a [`PluginDescriptor`](crate::plugins::PluginDescriptor)
//! depending on the `calculators` plugin, so installing a pack alongside
//! [`calculators_plugin`](crate::plugins::calculators_plugin) in one batch
//! always works regardless of declared order.
//!
//! ```rust
//! use feriae::dates::ndt;
//! use feriae::locales;
//! use feriae::plugins::{calculators_plugin, CapabilityRegistry};
//!
//! let mut registry = CapabilityRegistry::new();
//! registry
//!     .install(vec![calculators_plugin(), locales::us_pack(), locales::kr_pack()])
//!     .unwrap();
//! assert!(registry.engine().is_holiday(&ndt(2024, 7, 4), "us").unwrap());
//! assert!(registry.engine().is_holiday(&ndt(2025, 1, 29), "kr").unwrap());
//! ```

mod de;
mod kr;
mod us;

pub use de::de_pack;
pub use kr::kr_pack;
pub use us::us_pack;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{calculators_plugin, CapabilityRegistry};

    #[test]
    fn test_all_packs_install_together() {
        let mut registry = CapabilityRegistry::new();
        registry
            .install(vec![calculators_plugin(), us_pack(), de_pack(), kr_pack()])
            .unwrap();
        assert_eq!(
            registry.installed(),
            vec!["calculators", "us-holidays", "de-holidays", "kr-holidays"]
        );
    }
}
