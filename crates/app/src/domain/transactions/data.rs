//! Transactions Data

use crate::domain::{
    customers::records::CustomerUuid, tiers::records::DiscountType, venues::records::VenueUuid,
};

/// A completed sale as reported by a terminal at checkout.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub customer_uuid: CustomerUuid,
    pub venue_uuid: VenueUuid,

    /// Terminal-side ticket reference, for reconciliation.
    pub ticket_ref: Option<String>,

    /// Amounts in minor units.
    pub total_amount: i64,
    pub wet_total: i64,
    pub dry_total: i64,
    pub discount_amount: i64,

    pub discount_type: DiscountType,

    /// Tier label at the moment of sale, snapshotted for reporting.
    pub tier_at_visit: Option<String>,

    pub promo_code: Option<String>,
    pub items: Vec<NewLineItem>,
}

/// One line item on a sale.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub product_name: String,
    pub product_group: Option<String>,
    pub quantity: f64,

    /// Unit price in minor units.
    pub price: i64,

    /// Drink vs. food, for preference grouping.
    pub is_wet: bool,
}
