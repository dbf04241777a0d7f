use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::support::SupportPlan;

/// Base rates per asset type (USD per sqm per year) and support markups.
///
/// Lookups never fail: an unconfigured asset type or tier prices at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTables {
    #[serde(default)]
    pub energy: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub security: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub mobility: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub support_plans: BTreeMap<String, Decimal>,
}

impl Default for RateTables {
    fn default() -> Self {
        // (asset type, energy, security, mobility) with rates as (units, scale).
        const ASSETS: [(&str, (i64, u32), (i64, u32), (i64, u32)); 16] = [
            ("Commercial Building", (9615413993, 10), (96, 2), (96, 2)),
            ("Residential Building", (76925, 5), (64, 2), (64, 2)),
            ("Warehouse", (38466667, 8), (64, 2), (64, 2)),
            ("Open Area", (1923, 4), (32, 2), (32, 2)),
            ("Data Centre", (480775, 5), (128, 2), (64, 2)),
            ("Sports District", (173076, 5), (128, 2), (160, 2)),
            ("Airport Terminal(s)", (26923, 4), (192, 2), (192, 2)),
            ("Port Terminal", (192308, 5), (64, 2), (96, 2)),
            ("Commercial Center (Mall)", (173077, 5), (128, 2), (128, 2)),
            ("Manufacturing Facility", (2307666667, 9), (96, 2), (64, 2)),
            ("Hospital Building", (28846, 4), (128, 2), (128, 2)),
            ("Education Building", (115385, 5), (96, 2), (96, 2)),
            ("Parking Area", (1923, 4), (32, 2), (32, 2)),
            ("Open Road", (1923, 4), (32, 2), (32, 2)),
            ("Intersection", (3845, 4), (96, 2), (96, 2)),
            ("Public Transport Terminal", (13462, 4), (128, 2), (128, 2)),
        ];

        let rate = |(units, scale): (i64, u32)| Decimal::new(units, scale);
        let mut tables = Self {
            energy: BTreeMap::new(),
            security: BTreeMap::new(),
            mobility: BTreeMap::new(),
            support_plans: BTreeMap::from([
                ("8x5".to_string(), Decimal::new(12, 2)),
                ("16x5".to_string(), Decimal::new(15, 2)),
                ("24x7".to_string(), Decimal::new(20, 2)),
            ]),
        };
        for (asset, energy, security, mobility) in ASSETS {
            tables.energy.insert(asset.to_string(), rate(energy));
            tables.security.insert(asset.to_string(), rate(security));
            tables.mobility.insert(asset.to_string(), rate(mobility));
        }
        tables
    }
}

impl RateTables {
    /// Reads a complete replacement table set from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        toml::from_str(&raw)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
    }

    pub fn energy_rate(&self, asset_type: &str) -> Decimal {
        lookup(&self.energy, asset_type)
    }

    pub fn security_rate(&self, asset_type: &str) -> Decimal {
        lookup(&self.security, asset_type)
    }

    pub fn mobility_rate(&self, asset_type: &str) -> Decimal {
        lookup(&self.mobility, asset_type)
    }

    pub fn support_rate(&self, plan: &SupportPlan) -> Decimal {
        lookup(&self.support_plans, plan.as_str())
    }

    /// Asset types offered for selection, taken from the energy table.
    pub fn asset_types(&self) -> Vec<&str> {
        self.energy.keys().map(String::as_str).collect()
    }

    pub fn support_plans(&self) -> Vec<&str> {
        self.support_plans.keys().map(String::as_str).collect()
    }
}

fn lookup(table: &BTreeMap<String, Decimal>, key: &str) -> Decimal {
    table.get(key).copied().unwrap_or(Decimal::ZERO)
}
