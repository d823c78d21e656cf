//! Promo restriction checks and bonus arithmetic.
//!
//! Restrictions are evaluated in a fixed order and short-circuit on the
//! first failure: active → venue scope → date range → time of day → day of
//! week → membership → minimum spend → usage limits. Existence is checked
//! by the caller's lookup before any of this runs.

use jiff::{
    Zoned,
    civil::{Time, Weekday},
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::domain::{
    promos::{errors::PromoRejection, records::PromoRecord},
    venues::records::VenueUuid,
};

/// Prior-use counts for a promo, derived from the usage ledger.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct UsageCounts {
    pub total: i64,
    pub by_customer: i64,
}

/// The present moment and caller, as the restriction checks see them.
#[derive(Debug, Clone)]
pub(crate) struct EvaluationContext {
    pub venue: VenueUuid,
    pub customer_known: bool,
    pub now: Zoned,

    /// Transaction total in minor units; min-spend is only checked when set.
    pub total_amount: Option<i64>,
}

/// Run every restriction in order, returning the first failure.
pub(crate) fn check_restrictions(
    promo: &PromoRecord,
    ctx: &EvaluationContext,
    usage: UsageCounts,
) -> Result<(), PromoRejection> {
    if !promo.is_active {
        return Err(PromoRejection::Inactive);
    }

    if let Some(venue) = promo.venue_uuid {
        if venue != ctx.venue {
            return Err(PromoRejection::WrongVenue);
        }
    }

    let now = ctx.now.timestamp();

    if let Some(valid_from) = promo.valid_from {
        if valid_from > now {
            return Err(PromoRejection::NotYetActive);
        }
    }

    if let Some(valid_until) = promo.valid_until {
        if valid_until < now {
            return Err(PromoRejection::Expired);
        }
    }

    if !time_allows(promo.time_start, promo.time_end, ctx.now.time()) {
        return Err(PromoRejection::OutsideHours);
    }

    if !day_allows(&promo.valid_days, ctx.now.weekday()) {
        return Err(PromoRejection::WrongDay);
    }

    if promo.requires_membership && !ctx.customer_known {
        return Err(PromoRejection::MembershipRequired);
    }

    if let (Some(min_spend), Some(total)) = (promo.min_spend, ctx.total_amount) {
        if total < min_spend {
            return Err(PromoRejection::BelowMinSpend { min_spend });
        }
    }

    check_usage(promo, usage)
}

/// Usage limits count prior redemptions: the Nth use is allowed while the
/// prior count is below the limit.
pub(crate) fn check_usage(promo: &PromoRecord, usage: UsageCounts) -> Result<(), PromoRejection> {
    if let Some(max_uses) = promo.max_uses {
        if usage.total >= max_uses {
            return Err(PromoRejection::UsageLimitReached);
        }
    }

    if let Some(max_per_customer) = promo.max_uses_per_customer {
        if usage.by_customer >= max_per_customer {
            return Err(PromoRejection::UsageLimitReached);
        }
    }

    Ok(())
}

/// Wall-clock window check. Bounds are inclusive and never wrap midnight; a
/// start after the end matches nothing.
fn time_allows(start: Option<Time>, end: Option<Time>, now: Time) -> bool {
    match (start, end) {
        (None, None) => true,
        (Some(start), None) => now >= start,
        (None, Some(end)) => now <= end,
        (Some(start), Some(end)) => now >= start && now <= end,
    }
}

fn day_allows(valid_days: &[Weekday], today: Weekday) -> bool {
    valid_days.is_empty() || valid_days.contains(&today)
}

/// Boosted rates for a loyalty bonus over an existing base discount.
///
/// Additive percentages win over the multiplier when either is non-zero;
/// otherwise the multiplier applies (1 when unset). Both channels cap at 100.
pub(crate) fn boosted_rates(
    multiplier: Option<f64>,
    add_wet: f64,
    add_dry: f64,
    base_wet: f64,
    base_dry: f64,
) -> (f64, f64) {
    if add_wet > 0.0 || add_dry > 0.0 {
        ((base_wet + add_wet).min(100.0), (base_dry + add_dry).min(100.0))
    } else {
        let multiplier = multiplier.filter(|multiplier| *multiplier > 0.0).unwrap_or(1.0);

        (
            (base_wet * multiplier).min(100.0),
            (base_dry * multiplier).min(100.0),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized weekday \"{0}\"")]
pub struct UnknownWeekday(String);

/// Parse a comma-separated weekday list ("Mon,Tue,Wed").
///
/// # Errors
///
/// Returns an error when any entry is not a short weekday name.
pub fn parse_valid_days(raw: &str) -> Result<SmallVec<[Weekday; 7]>, UnknownWeekday> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_weekday(entry).ok_or_else(|| UnknownWeekday(entry.to_string())))
        .collect()
}

/// Render a weekday list back to its storage form.
#[must_use]
pub fn format_valid_days(days: &[Weekday]) -> String {
    days.iter()
        .map(|day| weekday_abbrev(*day))
        .collect::<Vec<_>>()
        .join(",")
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value {
        "Mon" => Some(Weekday::Monday),
        "Tue" => Some(Weekday::Tuesday),
        "Wed" => Some(Weekday::Wednesday),
        "Thu" => Some(Weekday::Thursday),
        "Fri" => Some(Weekday::Friday),
        "Sat" => Some(Weekday::Saturday),
        "Sun" => Some(Weekday::Sunday),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use jiff::{Span, Timestamp, civil::time, tz::TimeZone};
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::domain::promos::records::{PromoKind, PromoUuid};

    use super::*;

    fn promo() -> PromoRecord {
        PromoRecord {
            uuid: PromoUuid::new(),
            code: "SUMMER24".to_string(),
            name: "Summer promo".to_string(),
            description: None,
            kind: PromoKind::PromoCode {
                wet_discount: 15.0,
                dry_discount: 15.0,
            },
            venue_uuid: None,
            min_spend: None,
            valid_from: None,
            valid_until: None,
            time_start: None,
            time_end: None,
            valid_days: SmallVec::new(),
            max_uses: None,
            max_uses_per_customer: None,
            requires_membership: false,
            is_active: true,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    // 2024-06-12 12:00 UTC was a Wednesday.
    fn wednesday_noon() -> Zoned {
        "2024-06-12T12:00:00Z"
            .parse::<Timestamp>()
            .expect("valid timestamp")
            .to_zoned(TimeZone::UTC)
    }

    fn ctx() -> EvaluationContext {
        EvaluationContext {
            venue: VenueUuid::new(),
            customer_known: true,
            now: wednesday_noon(),
            total_amount: None,
        }
    }

    #[test]
    fn unrestricted_promo_passes() {
        assert_eq!(
            check_restrictions(&promo(), &ctx(), UsageCounts::default()),
            Ok(())
        );
    }

    #[test]
    fn inactive_is_reported_before_other_failures() {
        let mut promo = promo();
        promo.is_active = false;
        // Also expired; the active check must win.
        promo.valid_until = Some(Timestamp::UNIX_EPOCH);

        assert_eq!(
            check_restrictions(&promo, &ctx(), UsageCounts::default()),
            Err(PromoRejection::Inactive)
        );
    }

    #[test]
    fn venue_scoped_promo_rejects_other_venues() {
        let mut promo = promo();
        promo.venue_uuid = Some(VenueUuid::new());

        assert_eq!(
            check_restrictions(&promo, &ctx(), UsageCounts::default()),
            Err(PromoRejection::WrongVenue)
        );
    }

    #[test]
    fn venue_scoped_promo_accepts_its_own_venue() {
        let ctx = ctx();
        let mut promo = promo();
        promo.venue_uuid = Some(ctx.venue);

        assert_eq!(check_restrictions(&promo, &ctx, UsageCounts::default()), Ok(()));
    }

    #[test]
    fn date_range_bounds_are_checked() {
        let ctx = ctx();
        let now = ctx.now.timestamp();

        let mut not_yet = promo();
        not_yet.valid_from = Some(now + Span::new().hours(1));

        let mut expired = promo();
        expired.valid_until = Some(now - Span::new().hours(1));

        assert_eq!(
            check_restrictions(&not_yet, &ctx, UsageCounts::default()),
            Err(PromoRejection::NotYetActive)
        );
        assert_eq!(
            check_restrictions(&expired, &ctx, UsageCounts::default()),
            Err(PromoRejection::Expired)
        );
    }

    #[test]
    fn start_only_time_bound_is_open_ended() {
        let mut promo = promo();
        promo.time_start = Some(time(11, 30, 0, 0));

        assert_eq!(check_restrictions(&promo, &ctx(), UsageCounts::default()), Ok(()));

        promo.time_start = Some(time(14, 0, 0, 0));

        assert_eq!(
            check_restrictions(&promo, &ctx(), UsageCounts::default()),
            Err(PromoRejection::OutsideHours)
        );
    }

    #[test]
    fn end_only_time_bound_covers_the_morning() {
        let mut promo = promo();
        promo.time_end = Some(time(14, 0, 0, 0));

        assert_eq!(check_restrictions(&promo, &ctx(), UsageCounts::default()), Ok(()));

        promo.time_end = Some(time(11, 0, 0, 0));

        assert_eq!(
            check_restrictions(&promo, &ctx(), UsageCounts::default()),
            Err(PromoRejection::OutsideHours)
        );
    }

    #[test]
    fn both_time_bounds_are_inclusive() {
        let mut promo = promo();
        promo.time_start = Some(time(12, 0, 0, 0));
        promo.time_end = Some(time(14, 30, 0, 0));

        // Noon exactly on the start bound.
        assert_eq!(check_restrictions(&promo, &ctx(), UsageCounts::default()), Ok(()));
    }

    #[test]
    fn inverted_time_window_matches_nothing() {
        // A start after the end is an accepted misconfiguration that simply
        // never matches.
        let mut promo = promo();
        promo.time_start = Some(time(14, 0, 0, 0));
        promo.time_end = Some(time(11, 0, 0, 0));

        assert_eq!(
            check_restrictions(&promo, &ctx(), UsageCounts::default()),
            Err(PromoRejection::OutsideHours)
        );
    }

    #[test]
    fn day_restriction_matches_current_weekday() {
        let mut promo = promo();
        promo.valid_days = smallvec![Weekday::Monday, Weekday::Wednesday];

        assert_eq!(check_restrictions(&promo, &ctx(), UsageCounts::default()), Ok(()));

        promo.valid_days = smallvec![Weekday::Saturday, Weekday::Sunday];

        assert_eq!(
            check_restrictions(&promo, &ctx(), UsageCounts::default()),
            Err(PromoRejection::WrongDay)
        );
    }

    #[test]
    fn membership_requirement_blocks_guests_only() {
        let mut promo = promo();
        promo.requires_membership = true;

        assert_eq!(check_restrictions(&promo, &ctx(), UsageCounts::default()), Ok(()));

        let mut guest = ctx();
        guest.customer_known = false;

        assert_eq!(
            check_restrictions(&promo, &guest, UsageCounts::default()),
            Err(PromoRejection::MembershipRequired)
        );
    }

    #[test]
    fn min_spend_is_only_checked_when_a_total_is_supplied() {
        let mut promo = promo();
        promo.min_spend = Some(2000);

        assert_eq!(check_restrictions(&promo, &ctx(), UsageCounts::default()), Ok(()));

        let mut with_total = ctx();
        with_total.total_amount = Some(1500);

        assert_eq!(
            check_restrictions(&promo, &with_total, UsageCounts::default()),
            Err(PromoRejection::BelowMinSpend { min_spend: 2000 })
        );

        with_total.total_amount = Some(2000);

        assert_eq!(
            check_restrictions(&promo, &with_total, UsageCounts::default()),
            Ok(())
        );
    }

    #[test]
    fn usage_limit_blocks_at_the_boundary() {
        let mut promo = promo();
        promo.max_uses = Some(1);

        assert_eq!(
            check_usage(&promo, UsageCounts { total: 0, by_customer: 0 }),
            Ok(())
        );
        assert_eq!(
            check_usage(&promo, UsageCounts { total: 1, by_customer: 0 }),
            Err(PromoRejection::UsageLimitReached)
        );
    }

    #[test]
    fn per_customer_limit_is_independent_of_the_global_one() {
        let mut promo = promo();
        promo.max_uses_per_customer = Some(2);

        assert_eq!(
            check_usage(&promo, UsageCounts { total: 10, by_customer: 1 }),
            Ok(())
        );
        assert_eq!(
            check_usage(&promo, UsageCounts { total: 10, by_customer: 2 }),
            Err(PromoRejection::UsageLimitReached)
        );
    }

    #[test]
    fn additive_bonus_wins_over_multiplier_when_both_set() {
        // add 5/10 with a x2 multiplier over a (10, 10) base: the additive
        // fields take priority.
        assert_eq!(boosted_rates(Some(2.0), 5.0, 10.0, 10.0, 10.0), (15.0, 20.0));
    }

    #[test]
    fn multiplier_applies_when_no_additive_fields() {
        assert_eq!(boosted_rates(Some(2.0), 0.0, 0.0, 10.0, 15.0), (20.0, 30.0));
    }

    #[test]
    fn missing_multiplier_defaults_to_identity() {
        assert_eq!(boosted_rates(None, 0.0, 0.0, 10.0, 15.0), (10.0, 15.0));
    }

    #[test]
    fn boosted_rates_cap_at_one_hundred() {
        assert_eq!(boosted_rates(Some(3.0), 0.0, 0.0, 40.0, 50.0), (100.0, 100.0));
        assert_eq!(boosted_rates(None, 90.0, 90.0, 40.0, 50.0), (100.0, 100.0));
    }

    #[test]
    fn valid_days_round_trip_through_storage_form() -> TestResult {
        let days = parse_valid_days("Mon, Tue,Wed")?;

        assert_eq!(
            days.as_slice(),
            [Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday]
        );
        assert_eq!(format_valid_days(&days), "Mon,Tue,Wed");

        Ok(())
    }

    #[test]
    fn empty_valid_days_parse_to_no_restriction() -> TestResult {
        assert!(parse_valid_days("")?.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_weekday_is_rejected() {
        assert!(parse_valid_days("Mon,Funday").is_err());
    }
}
