//! Billing plan options offered at checkout.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PlanId;

/// How often a plan bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Month,
    Quarter,
    Year,
}

/// A billing tier offered at checkout.
///
/// Monetary values are i64 cents, never floats. `stripe_price_id` may
/// be absent; the server mints one lazily when the intent is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOption {
    pub id: PlanId,
    pub name: String,
    pub price_cents: i64,
    pub billing_interval: BillingInterval,
    #[serde(default)]
    pub stripe_price_id: Option<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Identifier used for the synthetic fallback plan.
const SYNTHETIC_MONTHLY_ID: &str = "flat-monthly";

/// Resolves the plans to offer at checkout.
///
/// Clinic/treatment-defined multi-tier plans win when present: they are
/// sorted by explicit sort order and only the first popular plan keeps
/// its badge. With no tiered plans, a flat product price becomes a
/// single synthetic monthly plan. With neither, the list is empty and
/// checkout cannot proceed.
pub fn resolve_plans(
    tiered: Vec<PlanOption>,
    flat_price_cents: Option<i64>,
    product_name: &str,
) -> Vec<PlanOption> {
    if !tiered.is_empty() {
        let mut plans = tiered;
        plans.sort_by_key(|p| p.sort_order);
        let mut popular_seen = false;
        for plan in &mut plans {
            if plan.is_popular {
                if popular_seen {
                    plan.is_popular = false;
                } else {
                    popular_seen = true;
                }
            }
        }
        return plans;
    }

    match flat_price_cents {
        Some(price_cents) if price_cents > 0 => vec![PlanOption {
            id: PlanId::new(SYNTHETIC_MONTHLY_ID).expect("constant id is non-empty"),
            name: format!("{} Monthly", product_name),
            price_cents,
            billing_interval: BillingInterval::Month,
            stripe_price_id: None,
            is_popular: false,
            sort_order: 0,
        }],
        _ => Vec::new(),
    }
}
