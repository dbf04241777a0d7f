/// Main-asset categories a quote can be built for, in picker order.
pub const MAIN_ASSETS: [&str; 18] = [
    "City",
    "Municipality",
    "Mixed-Use District",
    "Mixed-Use Campus",
    "Sports District",
    "Industrial District",
    "Airport",
    "Port",
    "Healthcare Campus",
    "Education Campus",
    "Large Enterprise",
    "Commercial Portfolio Owner",
    "Residential Portfolio Owner",
    "Data Center",
    "Warehouse",
    "Open Area",
    "Remote Site",
    "Building",
];

/// Main assets that are quoted as groups of sub-categories.
pub const HIERARCHICAL_MAIN_ASSETS: [&str; 4] =
    ["City", "Municipality", "Mixed-Use District", "Mixed-Use Campus"];

pub fn is_hierarchical(main_asset: &str) -> bool {
    HIERARCHICAL_MAIN_ASSETS.contains(&main_asset)
}

/// Categories a line item may be tagged with under the given main asset.
pub fn sub_main_asset_options(main_asset: &str) -> Vec<&'static str> {
    MAIN_ASSETS.iter().copied().filter(|candidate| *candidate != main_asset).collect()
}
