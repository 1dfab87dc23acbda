//! Subscription tiers, the plan catalogue, payment orders, and the single-row
//! subscription record.
//!
//! The effective tier is derived from `subscription`: an `active` row whose
//! `expires_at` is absent or in the future grants its plan; anything else is
//! `free`.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::types::Tier;
use super::{contacts, format_timestamp, CrmError, Result};
use crate::health::parse_timestamp;

pub const FREE_CONTACT_LIMIT: u32 = 5;
pub const PAID_CONTACT_LIMIT: u32 = 999;

/// Feature switches per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    pub ai_call_prep: bool,
    pub ai_insights: bool,
    pub voice_recording: bool,
    pub shared_mode: bool,
    pub unlimited_contacts: bool,
    pub calendar_suggestions: bool,
    pub advanced_memory_bank: bool,
}

impl Features {
    pub fn for_tier(tier: Tier) -> Self {
        let paid = tier != Tier::Free;
        let top = tier == Tier::Premium;
        Self {
            ai_call_prep: paid,
            ai_insights: paid,
            voice_recording: paid,
            shared_mode: top,
            unlimited_contacts: paid,
            calendar_suggestions: top,
            advanced_memory_bank: top,
        }
    }
}

/// One entry of the public plan catalogue.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: Tier,
    pub name: &'static str,
    /// Display price.
    pub price: &'static str,
    /// Charge in the smallest currency unit (paise).
    pub amount: u64,
    pub contacts: u32,
    pub features: Vec<&'static str>,
}

pub fn contact_limit(tier: Tier) -> u32 {
    match tier {
        Tier::Free => FREE_CONTACT_LIMIT,
        Tier::Plus | Tier::Premium => PAID_CONTACT_LIMIT,
    }
}

pub fn plan(tier: Tier) -> Plan {
    match tier {
        Tier::Free => Plan {
            id: Tier::Free,
            name: "Free",
            price: "₹0",
            amount: 0,
            contacts: contact_limit(Tier::Free),
            features: vec![
                "Up to 5 contacts",
                "Connection health tracking",
                "Gentle reminders",
            ],
        },
        Tier::Plus => Plan {
            id: Tier::Plus,
            name: "Touch Plus",
            price: "₹499/month",
            amount: 49_900,
            contacts: contact_limit(Tier::Plus),
            features: vec![
                "Unlimited contacts",
                "AI call prep",
                "AI relationship insights",
                "Voice notes with transcription",
            ],
        },
        Tier::Premium => Plan {
            id: Tier::Premium,
            name: "Touch Premium",
            price: "₹999/month",
            amount: 99_900,
            contacts: contact_limit(Tier::Premium),
            features: vec![
                "Everything in Plus",
                "Shared mode for couples and co-parents",
                "Advanced memory bank",
                "Calendar suggestions",
            ],
        },
    }
}

pub fn plans() -> Vec<Plan> {
    [Tier::Free, Tier::Plus, Tier::Premium]
        .into_iter()
        .map(plan)
        .collect()
}

/// Answer to "what can I do right now".
#[derive(Debug, Clone, Serialize)]
pub struct PremiumStatus {
    pub tier: Tier,
    pub contact_limit: u32,
    pub contacts_used: u64,
    pub features: Features,
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub active: bool,
    pub plan_id: Tier,
    pub status: String,
    pub amount: u64,
    pub currency: String,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub started_at: Option<String>,
    pub expires_at: Option<String>,
}

/// Read the subscription row and resolve whether it is currently in force.
pub fn get_subscription(conn: &Connection, now: DateTime<Utc>) -> Result<Subscription> {
    conn.execute("INSERT OR IGNORE INTO subscription (id) VALUES ('default')", [])?;
    let (plan_raw, status, amount, currency, order_id, payment_id, started_at, expires_at): (
        String,
        String,
        i64,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    ) = conn.query_row(
        "SELECT plan_id, status, amount, currency, order_id, payment_id, started_at, expires_at \
         FROM subscription WHERE id = 'default'",
        [],
        |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        },
    )?;

    let plan_id = plan_raw.parse::<Tier>().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unknown stored plan, treating as free");
        Tier::Free
    });
    let unexpired = match expires_at.as_deref() {
        None => true,
        Some(raw) => parse_timestamp(raw).is_some_and(|at| at > now),
    };
    let active = status == "active" && plan_id != Tier::Free && unexpired;

    Ok(Subscription {
        active,
        plan_id: if active { plan_id } else { Tier::Free },
        status: if active { status } else { "inactive".into() },
        amount: amount.max(0) as u64,
        currency,
        order_id,
        payment_id,
        started_at,
        expires_at,
    })
}

/// The tier currently in force.
pub fn current_tier(conn: &Connection, now: DateTime<Utc>) -> Result<Tier> {
    Ok(get_subscription(conn, now)?.plan_id)
}

pub fn status(conn: &Connection, now: DateTime<Utc>) -> Result<PremiumStatus> {
    let tier = current_tier(conn, now)?;
    Ok(PremiumStatus {
        tier,
        contact_limit: contact_limit(tier),
        contacts_used: contacts::count_active(conn)?,
        features: Features::for_tier(tier),
        plans: plans(),
    })
}

/// Fail with [`CrmError::LimitReached`] if one more active contact would
/// exceed the current tier's limit.
pub fn ensure_contact_capacity(conn: &Connection, now: DateTime<Utc>) -> Result<()> {
    let tier = current_tier(conn, now)?;
    let limit = contact_limit(tier);
    if contacts::count_active(conn)? >= u64::from(limit) {
        return Err(CrmError::LimitReached {
            tier: tier.as_str(),
            limit,
        });
    }
    Ok(())
}

/// Switch tier without a payment. Upgrading this way never expires;
/// choosing `free` is the same as cancelling.
pub fn upgrade(conn: &Connection, tier: Tier, now: DateTime<Utc>) -> Result<Subscription> {
    if tier == Tier::Free {
        return cancel_subscription(conn, now);
    }
    conn.execute(
        "INSERT INTO subscription (id, plan_id, status, amount, currency, order_id, payment_id, \
         started_at, expires_at) VALUES ('default', ?1, 'active', 0, 'INR', NULL, NULL, ?2, NULL) \
         ON CONFLICT(id) DO UPDATE SET plan_id = ?1, status = 'active', amount = 0, \
         order_id = NULL, payment_id = NULL, started_at = ?2, expires_at = NULL",
        params![tier.as_str(), format_timestamp(now)],
    )?;
    tracing::info!(tier = %tier, "tier changed");
    get_subscription(conn, now)
}

/// A payment order as recorded locally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOrder {
    pub order_id: String,
    pub plan_id: Tier,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub payment_id: Option<String>,
    pub test_mode: bool,
    pub created_at: String,
}

pub fn record_order(
    conn: &Connection,
    order_id: &str,
    tier: Tier,
    amount: u64,
    currency: &str,
    test_mode: bool,
    now: DateTime<Utc>,
) -> Result<PaymentOrder> {
    conn.execute(
        "INSERT INTO payment_orders (order_id, plan_id, amount, currency, status, payment_id, \
         test_mode, created_at) VALUES (?1, ?2, ?3, ?4, 'created', NULL, ?5, ?6)",
        params![
            order_id,
            tier.as_str(),
            amount as i64,
            currency,
            test_mode,
            format_timestamp(now)
        ],
    )?;
    tracing::info!(order_id, plan = %tier, amount, test_mode, "payment order recorded");
    get_order(conn, order_id)
}

pub fn get_order(conn: &Connection, order_id: &str) -> Result<PaymentOrder> {
    let row = conn
        .query_row(
            "SELECT order_id, plan_id, amount, currency, status, payment_id, test_mode, created_at \
             FROM payment_orders WHERE order_id = ?1",
            params![order_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, bool>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| CrmError::not_found("Order", order_id))?;

    let plan_id = row.1.parse::<Tier>().map_err(CrmError::Invalid)?;
    Ok(PaymentOrder {
        order_id: row.0,
        plan_id,
        amount: row.2.max(0) as u64,
        currency: row.3,
        status: row.4,
        payment_id: row.5,
        test_mode: row.6,
        created_at: row.7,
    })
}

/// Mark an order paid and start a subscription of `days` for its plan.
pub fn activate_subscription(
    conn: &mut Connection,
    order: &PaymentOrder,
    payment_id: &str,
    days: i64,
    now: DateTime<Utc>,
) -> Result<Subscription> {
    let started = format_timestamp(now);
    let expires = format_timestamp(now + Duration::days(days));

    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE payment_orders SET status = 'paid', payment_id = ?1 WHERE order_id = ?2",
        params![payment_id, order.order_id],
    )?;
    tx.execute(
        "INSERT INTO subscription (id, plan_id, status, amount, currency, order_id, payment_id, \
         started_at, expires_at) VALUES ('default', ?1, 'active', ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT(id) DO UPDATE SET plan_id = ?1, status = 'active', amount = ?2, \
         currency = ?3, order_id = ?4, payment_id = ?5, started_at = ?6, expires_at = ?7",
        params![
            order.plan_id.as_str(),
            order.amount as i64,
            order.currency,
            order.order_id,
            payment_id,
            started,
            expires,
        ],
    )?;
    tx.commit()?;

    tracing::info!(
        order_id = %order.order_id,
        plan = %order.plan_id,
        expires_at = %expires,
        "subscription activated"
    );
    get_subscription(conn, now)
}

/// Revert to the free tier.
pub fn cancel_subscription(conn: &Connection, now: DateTime<Utc>) -> Result<Subscription> {
    conn.execute(
        "INSERT INTO subscription (id, plan_id, status) VALUES ('default', 'free', 'cancelled') \
         ON CONFLICT(id) DO UPDATE SET plan_id = 'free', status = 'cancelled', amount = 0, \
         expires_at = NULL",
        [],
    )?;
    tracing::info!("subscription cancelled");
    get_subscription(conn, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::contacts::{count_active, create_contact, update_contact};
    use crate::crm::types::{ContactUpdate, NewContact};
    use crate::db;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn fresh_database_is_free() {
        let conn = db::open_memory_database().unwrap();
        let s = status(&conn, now()).unwrap();
        assert_eq!(s.tier, Tier::Free);
        assert_eq!(s.contact_limit, 5);
        assert_eq!(s.contacts_used, 0);
        assert!(!s.features.ai_call_prep);
        assert_eq!(s.plans.len(), 3);
    }

    #[test]
    fn catalogue_matches_charges() {
        assert_eq!(plan(Tier::Plus).amount, 49_900);
        assert_eq!(plan(Tier::Plus).name, "Touch Plus");
        assert_eq!(plan(Tier::Premium).amount, 99_900);
        assert_eq!(plan(Tier::Premium).name, "Touch Premium");
        assert!(plans().iter().all(|p| !p.features.is_empty()));
    }

    #[test]
    fn upgrade_to_plus_unlocks_features() {
        let conn = db::open_memory_database().unwrap();
        upgrade(&conn, Tier::Plus, now()).unwrap();
        let s = status(&conn, now()).unwrap();
        assert_eq!(s.tier, Tier::Plus);
        assert_eq!(s.contact_limit, 999);
        assert!(s.features.ai_call_prep);
        assert!(s.features.unlimited_contacts);
        assert!(!s.features.shared_mode);
    }

    #[test]
    fn free_tier_limit_is_enforced() {
        let conn = db::open_memory_database().unwrap();
        for i in 0..FREE_CONTACT_LIMIT {
            ensure_contact_capacity(&conn, now()).unwrap();
            create_contact(&conn, &NewContact::named(format!("C{i}")), now()).unwrap();
        }
        assert!(matches!(
            ensure_contact_capacity(&conn, now()),
            Err(CrmError::LimitReached { limit: 5, .. })
        ));
        upgrade(&conn, Tier::Premium, now()).unwrap();
        ensure_contact_capacity(&conn, now()).unwrap();
    }

    #[test]
    fn unarchiving_respects_the_free_tier_limit() {
        let conn = db::open_memory_database().unwrap();
        let first = create_contact(&conn, &NewContact::named("C0"), now()).unwrap();
        for i in 1..FREE_CONTACT_LIMIT {
            create_contact(&conn, &NewContact::named(format!("C{i}")), now()).unwrap();
        }

        let archive = ContactUpdate {
            is_archived: Some(true),
            ..ContactUpdate::default()
        };
        update_contact(&conn, &first.id, &archive, now()).unwrap();
        ensure_contact_capacity(&conn, now()).unwrap();
        create_contact(&conn, &NewContact::named("C5"), now()).unwrap();

        let restore = ContactUpdate {
            is_archived: Some(false),
            ..ContactUpdate::default()
        };
        assert!(matches!(
            update_contact(&conn, &first.id, &restore, now()),
            Err(CrmError::LimitReached { limit: 5, .. })
        ));
        assert_eq!(count_active(&conn).unwrap(), 5);

        // other edits to an active contact are unaffected by the cap
        let rename = ContactUpdate {
            name: Some("C5 renamed".into()),
            is_archived: Some(false),
            ..ContactUpdate::default()
        };
        let c5 = crate::crm::contacts::list_active(&conn, now())
            .unwrap()
            .into_iter()
            .find(|c| c.name == "C5")
            .unwrap();
        update_contact(&conn, &c5.id, &rename, now()).unwrap();

        upgrade(&conn, Tier::Plus, now()).unwrap();
        let restored = update_contact(&conn, &first.id, &restore, now()).unwrap();
        assert!(!restored.is_archived);
        assert_eq!(count_active(&conn).unwrap(), 6);
    }

    #[test]
    fn paid_subscription_lifecycle() {
        let mut conn = db::open_memory_database().unwrap();
        let order = record_order(&conn, "order_1", Tier::Premium, 99_900, "INR", true, now()).unwrap();
        assert_eq!(order.status, "created");

        let sub = activate_subscription(&mut conn, &order, "pay_1", 30, now()).unwrap();
        assert!(sub.active);
        assert_eq!(sub.plan_id, Tier::Premium);
        assert_eq!(sub.status, "active");
        assert_eq!(sub.amount, 99_900);
        assert_eq!(get_order(&conn, "order_1").unwrap().status, "paid");

        // Expired after 30 days.
        let later = now() + Duration::days(31);
        assert_eq!(current_tier(&conn, later).unwrap(), Tier::Free);

        let cancelled = cancel_subscription(&conn, now()).unwrap();
        assert!(!cancelled.active);
        assert_eq!(cancelled.plan_id, Tier::Free);
    }

    #[test]
    fn unknown_order_is_not_found() {
        let conn = db::open_memory_database().unwrap();
        assert!(matches!(get_order(&conn, "nope"), Err(CrmError::NotFound { .. })));
    }
}
