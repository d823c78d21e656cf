//! Tier selection logic.
//!
//! Visits are counted across all venues, then the customer's tier is the
//! best of what those visits earn at their home venue and at the visiting
//! venue. Whichever venue's thresholds win, the discount rates always come
//! from the visiting venue's configuration for the winning tier.

use tracing::warn;

use crate::domain::tiers::records::{
    DiscountType, NextTierInfo, StaffRates, TierRecord, TierResult, VenueTierConfig,
};

/// Rolling visit window when a venue has no tier configuration at all.
pub(crate) const DEFAULT_WINDOW_DAYS: i32 = 28;

const FALLBACK_TIER_NAME: &str = "Member";
const FALLBACK_RANK: i32 = 1;

const STAFF_TIER_NAME: &str = "Staff";

/// A tier as seen by the selection logic. Comparisons use rank, never names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QualifiedTier {
    pub name: String,
    pub rank: i32,
}

/// Rolling window for a venue: the smallest configured window, or the default.
pub(crate) fn window_days(configs: &[VenueTierConfig]) -> i32 {
    configs
        .iter()
        .map(|config| config.window_days)
        .min()
        .unwrap_or(DEFAULT_WINDOW_DAYS)
}

/// Tier used when the global catalog is missing its base entry.
pub(crate) fn synthetic_member() -> QualifiedTier {
    QualifiedTier {
        name: FALLBACK_TIER_NAME.to_string(),
        rank: FALLBACK_RANK,
    }
}

/// Highest-ranked tier at a venue whose threshold the visit count meets.
///
/// A venue with no qualifying config yields the Member fallback rather than
/// failing: an unreachable tier simply never wins.
pub(crate) fn best_qualifying(
    configs: &[VenueTierConfig],
    visits: i64,
    member_fallback: &QualifiedTier,
) -> QualifiedTier {
    configs
        .iter()
        .filter(|config| config.visits_required <= visits)
        .max_by_key(|config| config.rank)
        .map(|config| QualifiedTier {
            name: config.tier_name.clone(),
            rank: config.rank,
        })
        .unwrap_or_else(|| member_fallback.clone())
}

/// Pick between the home and visiting qualification. Home wins rank ties.
pub(crate) fn pick_winner(home: QualifiedTier, visiting: QualifiedTier) -> QualifiedTier {
    if home.rank >= visiting.rank { home } else { visiting }
}

/// Rates at the visiting venue for the winning rank; zero when unconfigured.
pub(crate) fn rates_for_rank(configs: &[VenueTierConfig], rank: i32) -> (f64, f64) {
    match configs.iter().find(|config| config.rank == rank) {
        Some(config) => (config.wet_discount, config.dry_discount),
        None => {
            warn!(rank, "no rate configured at visiting venue for winning tier");

            (0.0, 0.0)
        }
    }
}

/// Staff override: visiting venue's staff rates, no visit counting.
pub(crate) fn staff_result(home_venue_name: String, staff_rates: Option<StaffRates>) -> TierResult {
    let rates = staff_rates.unwrap_or(StaffRates {
        wet_discount: 0.0,
        dry_discount: 0.0,
    });

    TierResult {
        tier_name: STAFF_TIER_NAME.to_string(),
        rank: 0,
        is_staff: true,
        discount_type: DiscountType::Staff,
        wet_discount: rates.wet_discount,
        dry_discount: rates.dry_discount,
        visits: 0,
        window_days: 0,
        home_venue_name,
        home_tier_name: STAFF_TIER_NAME.to_string(),
        visiting_tier_name: STAFF_TIER_NAME.to_string(),
    }
}

/// Full dual-threshold resolution for a non-staff customer.
pub(crate) fn member_result(
    home_venue_name: String,
    home_configs: &[VenueTierConfig],
    visiting_configs: &[VenueTierConfig],
    member_tier: Option<&TierRecord>,
    visits: i64,
    window_days: i32,
) -> TierResult {
    let fallback = member_tier.map_or_else(synthetic_member, |tier| QualifiedTier {
        name: tier.name.clone(),
        rank: tier.rank,
    });

    let home = best_qualifying(home_configs, visits, &fallback);
    let visiting = best_qualifying(visiting_configs, visits, &fallback);

    let home_tier_name = home.name.clone();
    let visiting_tier_name = visiting.name.clone();

    let winner = pick_winner(home, visiting);
    let (wet_discount, dry_discount) = rates_for_rank(visiting_configs, winner.rank);

    TierResult {
        tier_name: winner.name,
        rank: winner.rank,
        is_staff: false,
        discount_type: DiscountType::Discount,
        wet_discount,
        dry_discount,
        visits,
        window_days,
        home_venue_name,
        home_tier_name,
        visiting_tier_name,
    }
}

/// Next tier above `current_rank` configured at the venue, if any.
pub(crate) fn next_tier(
    configs: &[VenueTierConfig],
    current_rank: i32,
    visits: i64,
) -> Option<NextTierInfo> {
    configs
        .iter()
        .filter(|config| config.rank > current_rank)
        .min_by_key(|config| config.rank)
        .map(|config| NextTierInfo {
            tier_name: config.tier_name.clone(),
            visits_to_go: config.visits_required - visits,
        })
}

#[cfg(test)]
mod tests {
    use crate::domain::tiers::records::TierUuid;

    use super::*;

    fn config(name: &str, rank: i32, visits_required: i64, wet: f64, dry: f64) -> VenueTierConfig {
        VenueTierConfig {
            tier_uuid: TierUuid::new(),
            tier_name: name.to_string(),
            rank,
            visits_required,
            window_days: 28,
            wet_discount: wet,
            dry_discount: dry,
        }
    }

    fn member_catalog() -> TierRecord {
        TierRecord {
            uuid: TierUuid::new(),
            name: "Member".to_string(),
            slug: "member".to_string(),
            rank: 1,
        }
    }

    #[test]
    fn window_days_takes_minimum_across_configs() {
        let mut configs = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 4, 8.0, 15.0),
        ];
        configs[1].window_days = 14;

        assert_eq!(window_days(&configs), 14);
    }

    #[test]
    fn window_days_defaults_when_unconfigured() {
        assert_eq!(window_days(&[]), DEFAULT_WINDOW_DAYS);
    }

    #[test]
    fn best_qualifying_picks_highest_rank_within_threshold() {
        let configs = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 2, 8.0, 15.0),
            config("Regular", 3, 4, 12.0, 20.0),
        ];

        let tier = best_qualifying(&configs, 3, &synthetic_member());

        assert_eq!(tier.name, "Loyalty");
        assert_eq!(tier.rank, 2);
    }

    #[test]
    fn best_qualifying_falls_back_to_member_when_nothing_qualifies() {
        // A venue that never configured a zero-visit base tier.
        let configs = vec![config("Loyalty", 2, 4, 8.0, 15.0)];

        let tier = best_qualifying(&configs, 1, &synthetic_member());

        assert_eq!(tier.name, "Member");
        assert_eq!(tier.rank, 1);
    }

    #[test]
    fn home_wins_rank_ties() {
        let home = QualifiedTier {
            name: "Loyalty".to_string(),
            rank: 2,
        };
        let visiting = QualifiedTier {
            name: "Loyalty".to_string(),
            rank: 2,
        };

        assert_eq!(pick_winner(home.clone(), visiting), home);
    }

    #[test]
    fn rates_come_from_visiting_config() {
        let visiting = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 4, 8.0, 15.0),
        ];

        assert_eq!(rates_for_rank(&visiting, 2), (8.0, 15.0));
    }

    #[test]
    fn rates_are_zero_when_winning_tier_unconfigured_at_visiting_venue() {
        let visiting = vec![config("Member", 1, 0, 5.0, 10.0)];

        assert_eq!(rates_for_rank(&visiting, 3), (0.0, 0.0));
    }

    // Home venue requires 2 visits for Loyalty, visiting requires 4; with 3
    // visits the home qualification wins but the visiting venue's Loyalty
    // rates apply.
    #[test]
    fn home_threshold_wins_with_visiting_rates() {
        let home = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 2, 10.0, 20.0),
        ];
        let visiting = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 4, 8.0, 15.0),
        ];
        let member = member_catalog();

        let result = member_result("Number Four".to_string(), &home, &visiting, Some(&member), 3, 28);

        assert_eq!(result.tier_name, "Loyalty");
        assert_eq!(result.rank, 2);
        assert_eq!(result.home_tier_name, "Loyalty");
        assert_eq!(result.visiting_tier_name, "Member");
        assert_eq!((result.wet_discount, result.dry_discount), (8.0, 15.0));
        assert_eq!(result.discount_type, DiscountType::Discount);
        assert_eq!(result.visits, 3);
    }

    // Home requires 4/8 visits for Loyalty/Regular, visiting requires 2/4;
    // with 5 visits the visiting venue's Regular qualification wins.
    #[test]
    fn visiting_threshold_wins_when_more_generous() {
        let home = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 4, 8.0, 15.0),
            config("Regular", 3, 8, 12.0, 20.0),
        ];
        let visiting = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 2, 10.0, 20.0),
            config("Regular", 3, 4, 15.0, 25.0),
        ];
        let member = member_catalog();

        let result = member_result("High Street".to_string(), &home, &visiting, Some(&member), 5, 28);

        assert_eq!(result.tier_name, "Regular");
        assert_eq!(result.home_tier_name, "Loyalty");
        assert_eq!(result.visiting_tier_name, "Regular");
        assert_eq!((result.wet_discount, result.dry_discount), (15.0, 25.0));
    }

    #[test]
    fn resolved_rank_is_max_of_home_and_visiting_ranks() {
        let member = member_catalog();

        for (home_required, visiting_required, visits) in
            [(0, 0, 0), (2, 4, 3), (4, 2, 3), (8, 8, 9), (1, 9, 5)]
        {
            let home = vec![
                config("Member", 1, 0, 5.0, 10.0),
                config("Loyalty", 2, home_required, 8.0, 15.0),
            ];
            let visiting = vec![
                config("Member", 1, 0, 5.0, 10.0),
                config("Loyalty", 2, visiting_required, 8.0, 15.0),
            ];

            let home_rank = best_qualifying(&home, visits, &synthetic_member()).rank;
            let visiting_rank = best_qualifying(&visiting, visits, &synthetic_member()).rank;

            let result =
                member_result("Home".to_string(), &home, &visiting, Some(&member), visits, 28);

            assert_eq!(result.rank, home_rank.max(visiting_rank));
        }
    }

    #[test]
    fn staff_result_uses_visiting_staff_rates_and_skips_visits() {
        let result = staff_result(
            "High Street".to_string(),
            Some(StaffRates {
                wet_discount: 25.0,
                dry_discount: 30.0,
            }),
        );

        assert!(result.is_staff);
        assert_eq!(result.discount_type, DiscountType::Staff);
        assert_eq!((result.wet_discount, result.dry_discount), (25.0, 30.0));
        assert_eq!(result.visits, 0);
        assert_eq!(result.window_days, 0);
        assert_eq!(result.tier_name, "Staff");
    }

    #[test]
    fn staff_result_defaults_to_zero_rates_when_unconfigured() {
        let result = staff_result("High Street".to_string(), None);

        assert_eq!((result.wet_discount, result.dry_discount), (0.0, 0.0));
        assert_eq!(result.discount_type, DiscountType::Staff);
    }

    #[test]
    fn member_result_survives_missing_catalog_row() {
        let result = member_result("Home".to_string(), &[], &[], None, 2, 28);

        assert_eq!(result.tier_name, "Member");
        assert_eq!(result.rank, 1);
        assert_eq!((result.wet_discount, result.dry_discount), (0.0, 0.0));
    }

    #[test]
    fn next_tier_returns_closest_higher_rank() {
        let configs = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 4, 8.0, 15.0),
            config("Regular", 3, 8, 12.0, 20.0),
        ];

        let next = next_tier(&configs, 1, 1);

        assert_eq!(
            next,
            Some(NextTierInfo {
                tier_name: "Loyalty".to_string(),
                visits_to_go: 3,
            })
        );
    }

    #[test]
    fn next_tier_is_none_at_top_tier() {
        let configs = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 4, 8.0, 15.0),
        ];

        assert_eq!(next_tier(&configs, 2, 6), None);
    }

    #[test]
    fn next_tier_visits_to_go_may_be_non_positive() {
        // Already eligible by count, but a home-venue rule kept the customer
        // on a lower tier here.
        let configs = vec![
            config("Member", 1, 0, 5.0, 10.0),
            config("Loyalty", 2, 4, 8.0, 15.0),
        ];

        let next = next_tier(&configs, 1, 5);

        assert_eq!(
            next,
            Some(NextTierInfo {
                tier_name: "Loyalty".to_string(),
                visits_to_go: -1,
            })
        );
    }
}
