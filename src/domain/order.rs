use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle states of an order. The placement workflow only ever produces
/// `Created`; the remaining states exist for downstream fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Created,
    Paid,
    Progress,
    Cancelled,
    Dispatched,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Progress => "PROGRESS",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Dispatched => "DISPATCHED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(OrderStatus::Created),
            "PAID" => Some(OrderStatus::Paid),
            "PROGRESS" => Some(OrderStatus::Progress),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            "DISPATCHED" => Some(OrderStatus::Dispatched),
            "DELIVERED" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

/// A requested line item: what the buyer asked for.
#[derive(Debug, Clone, Copy)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

/// An item the ledger refused to reserve, with the reason it gave.
#[derive(Debug, Clone)]
pub struct RejectedItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub reason: String,
}

/// Outcome of a successful placement: the persisted order plus the items
/// that could not be booked. Partial booking is an intended outcome, not a
/// failure mode.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderView,
    pub rejected: Vec<RejectedItem>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn status_roundtrips_through_strings() {
        for status in [
            OrderStatus::Created,
            OrderStatus::Paid,
            OrderStatus::Progress,
            OrderStatus::Cancelled,
            OrderStatus::Dispatched,
            OrderStatus::Delivered,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(OrderStatus::parse("SHIPPED"), None);
    }
}
