use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Listing state. Products are never deleted; delisting flips the status to
/// `Inactive`, which the reservation path treats as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ProductStatus::Active),
            "INACTIVE" => Some(ProductStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProductStatus,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub title: String,
    pub description: String,
    pub quantity: i32,
    /// `None` keeps the current status.
    pub status: Option<ProductStatus>,
}
