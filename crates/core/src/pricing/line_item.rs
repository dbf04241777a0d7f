use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line_item::LeafItem;
use crate::pricing::rates::RateTables;

/// Uplift applied to every module subscription for AI provisioning.
pub const AI_PROVISION: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
pub const MARGIN: Decimal = Decimal::from_parts(25, 0, 0, false, 2);
pub const CHANNEL_BASE_COST: Decimal = Decimal::from_parts(250, 0, 0, false, 0);
pub const INSIGHT_PROVISION: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Yearly cost of a single security or mobility video channel.
pub fn channel_unit_cost() -> Decimal {
    CHANNEL_BASE_COST / (Decimal::ONE - MARGIN)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPricing {
    pub sustainability_cost: Decimal,
    pub security_base_cost: Decimal,
    pub security_channel_cost: Decimal,
    pub security_cost: Decimal,
    pub mobility_base_cost: Decimal,
    pub mobility_channel_cost: Decimal,
    pub mobility_cost: Decimal,
    pub insight_cost: Decimal,
    pub support_cost: Decimal,
    pub yearly_subscription: Decimal,
    pub line_total: Decimal,
}

/// Prices one leaf item against `rates`.
///
/// Channel costs follow the raw channel counts even when the matching module
/// flag is off. The input layer clears counts when a module is disabled; a
/// stale count that slips through is still billed.
///
/// Arithmetic saturates at `Decimal::MAX`, so oversized sizes or quantities
/// price at the ceiling instead of failing.
pub fn price_line_item(item: &LeafItem, rates: &RateTables) -> LineItemPricing {
    let uplift = Decimal::ONE + AI_PROVISION;
    let footprint = item.size.saturating_mul(Decimal::from(item.quantity));
    let module_cost = |enabled: bool, rate: Decimal| {
        if enabled {
            rate.saturating_mul(footprint).saturating_mul(uplift)
        } else {
            Decimal::ZERO
        }
    };
    let per_channel = channel_unit_cost();

    let sustainability_cost =
        module_cost(item.sustainability, rates.energy_rate(&item.asset_type));
    let security_base_cost = module_cost(item.security, rates.security_rate(&item.asset_type));
    let security_channel_cost = Decimal::from(item.security_channels).saturating_mul(per_channel);
    let mobility_base_cost = module_cost(item.mobility, rates.mobility_rate(&item.asset_type));
    let mobility_channel_cost = Decimal::from(item.mobility_channels).saturating_mul(per_channel);

    // Channels are excluded from the insight base.
    let insight_base = sustainability_cost
        .saturating_add(security_base_cost)
        .saturating_add(mobility_base_cost);
    let insight_cost =
        if item.insight { insight_base.saturating_mul(INSIGHT_PROVISION) } else { Decimal::ZERO };

    let yearly_subscription = insight_base
        .saturating_add(insight_cost)
        .saturating_add(security_channel_cost)
        .saturating_add(mobility_channel_cost);
    let support_cost = yearly_subscription.saturating_mul(rates.support_rate(&item.support_plan));
    let line_total = yearly_subscription.saturating_add(support_cost);

    LineItemPricing {
        sustainability_cost,
        security_base_cost,
        security_channel_cost,
        security_cost: security_base_cost.saturating_add(security_channel_cost),
        mobility_base_cost,
        mobility_channel_cost,
        mobility_cost: mobility_base_cost.saturating_add(mobility_channel_cost),
        insight_cost,
        support_cost,
        yearly_subscription,
        line_total,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{channel_unit_cost, price_line_item};
    use crate::domain::line_item::LeafItem;
    use crate::domain::support::SupportPlan;
    use crate::pricing::rates::RateTables;

    fn blank(asset_type: &str) -> LeafItem {
        LeafItem {
            asset_type: asset_type.to_string(),
            size: Decimal::ZERO,
            ..LeafItem::new("t")
        }
    }

    fn commercial_building_fully_loaded() -> LeafItem {
        LeafItem {
            size: dec!(10000),
            quantity: 1,
            sustainability: true,
            security: true,
            security_channels: 4,
            mobility: true,
            mobility_channels: 2,
            insight: true,
            support_plan: SupportPlan::EightByFive,
            ..blank("Commercial Building")
        }
    }

    #[test]
    fn commercial_building_scenario_matches_worked_figures() {
        let pricing = price_line_item(&commercial_building_fully_loaded(), &RateTables::default());

        assert_eq!(pricing.sustainability_cost, dec!(11538.4967916));
        assert_eq!(pricing.security_base_cost, dec!(11520));
        assert_eq!(pricing.mobility_base_cost, dec!(11520));
        assert_eq!(pricing.security_channel_cost.round_dp(2), dec!(1333.33));
        assert_eq!(pricing.mobility_channel_cost.round_dp(2), dec!(666.67));
        assert_eq!(pricing.insight_cost, dec!(6915.69935832));
        assert_eq!(pricing.yearly_subscription.round_dp(2), dec!(43494.20));
        assert_eq!(pricing.support_cost.round_dp(2), dec!(5219.30));
        assert_eq!(pricing.line_total.round_dp(1), dec!(48713.5));
        assert_eq!(pricing.security_cost, pricing.security_base_cost + pricing.security_channel_cost);
        assert_eq!(pricing.mobility_cost, pricing.mobility_base_cost + pricing.mobility_channel_cost);
    }

    #[test]
    fn stale_security_channels_are_still_billed_when_module_is_off() {
        let item = LeafItem { security: false, security_channels: 4, ..blank("Commercial Building") };

        let pricing = price_line_item(&item, &RateTables::default());

        assert_eq!(pricing.security_base_cost, Decimal::ZERO);
        assert_eq!(pricing.security_channel_cost.round_dp(2), dec!(1333.33));
        assert_eq!(
            pricing.line_total.round_dp(10),
            (pricing.security_channel_cost * dec!(1.12)).round_dp(10)
        );
    }

    #[test]
    fn insight_ignores_channel_costs() {
        let item = LeafItem {
            insight: true,
            security_channels: 10,
            mobility_channels: 3,
            size: dec!(5000),
            ..blank("Warehouse")
        };

        let pricing = price_line_item(&item, &RateTables::default());

        assert_eq!(pricing.insight_cost, Decimal::ZERO);
        assert_eq!(
            pricing.yearly_subscription.round_dp(10),
            (channel_unit_cost() * dec!(13)).round_dp(10)
        );
    }

    #[test]
    fn quantity_scales_module_costs_but_not_channels() {
        let single = LeafItem {
            size: dec!(1000),
            sustainability: true,
            security_channels: 1,
            ..blank("Data Centre")
        };
        let triple = LeafItem { quantity: 3, ..single.clone() };

        let rates = RateTables::default();
        let one = price_line_item(&single, &rates);
        let three = price_line_item(&triple, &rates);

        assert_eq!(three.sustainability_cost, one.sustainability_cost * dec!(3));
        assert_eq!(three.security_channel_cost, one.security_channel_cost);
    }

    #[test]
    fn unknown_asset_and_support_tier_price_at_zero() {
        let item = LeafItem {
            size: dec!(2000),
            sustainability: true,
            security: true,
            mobility: true,
            insight: true,
            support_plan: SupportPlan::from("platinum"),
            ..blank("Lunar Base")
        };

        let pricing = price_line_item(&item, &RateTables::default());

        assert_eq!(pricing, Default::default());
    }

    #[test]
    fn support_markup_follows_tier() {
        let rates = RateTables::default();
        let base = LeafItem { size: dec!(1000), security: true, ..blank("Hospital Building") };

        for (plan, markup) in [
            (SupportPlan::EightByFive, dec!(0.12)),
            (SupportPlan::SixteenByFive, dec!(0.15)),
            (SupportPlan::TwentyFourBySeven, dec!(0.20)),
        ] {
            let pricing = price_line_item(&LeafItem { support_plan: plan, ..base.clone() }, &rates);
            assert_eq!(pricing.support_cost, pricing.yearly_subscription * markup);
        }
    }

    #[test]
    fn oversized_footprint_saturates_instead_of_overflowing() {
        let item = LeafItem {
            size: dec!(10000000000000000000),
            quantity: 4_000_000_000,
            sustainability: true,
            security: true,
            security_channels: u32::MAX,
            insight: true,
            support_plan: SupportPlan::TwentyFourBySeven,
            ..blank("Data Centre")
        };

        let pricing = price_line_item(&item, &RateTables::default());

        assert_eq!(pricing.sustainability_cost, Decimal::MAX);
        assert_eq!(pricing.yearly_subscription, Decimal::MAX);
        assert_eq!(pricing.line_total, Decimal::MAX);
        assert!(pricing.security_channel_cost < Decimal::MAX);
    }

    proptest! {
        #[test]
        fn line_total_dominates_yearly_subscription(
            size in 0u32..200_000,
            quantity in 0u32..50,
            security_channels in 0u32..500,
            mobility_channels in 0u32..500,
            flags in proptest::array::uniform4(any::<bool>()),
            asset_index in 0usize..17,
            plan_index in 0usize..4,
        ) {
            let rates = RateTables::default();
            let assets = rates.asset_types();
            let asset_type = assets.get(asset_index).copied().unwrap_or("Unconfigured");
            let plan = ["8x5", "16x5", "24x7", "none"][plan_index];

            let item = LeafItem {
                size: Decimal::from(size),
                quantity,
                sustainability: flags[0],
                security: flags[1],
                security_channels,
                mobility: flags[2],
                mobility_channels,
                insight: flags[3],
                support_plan: SupportPlan::from(plan),
                ..blank(asset_type)
            };

            let pricing = price_line_item(&item, &rates);
            prop_assert!(pricing.yearly_subscription >= Decimal::ZERO);
            prop_assert!(pricing.line_total >= pricing.yearly_subscription);
        }
    }
}
