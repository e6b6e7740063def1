use async_trait::async_trait;
use uuid::Uuid;

use super::errors::DomainError;
use super::identity::Identity;
use super::order::{OrderItemRequest, OrderView};
use super::product::{NewProduct, ProductUpdate, ProductView};

/// The order aggregate store. `find_by_id` and `list` are buyer-scoped:
/// visibility never crosses the owning `user_id`.
pub trait OrderRepository: Send + Sync + 'static {
    fn add(&self, user_id: Uuid, items: Vec<OrderItemRequest>) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, order_id: Uuid, user_id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<OrderView>, DomainError>;
}

/// The products store, including the inventory ledger's reservation
/// operation.
pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, owner_id: Uuid, product: NewProduct) -> Result<ProductView, DomainError>;
    fn update(&self, product_id: Uuid, changes: ProductUpdate) -> Result<ProductView, DomainError>;
    fn find_by_id(&self, product_id: Uuid) -> Result<Option<ProductView>, DomainError>;

    /// Atomically decrement `quantity` if the product is active and has
    /// sufficient stock. The conditional write is the serialization point
    /// for concurrent buyers; a lost race surfaces as `Conflict` and is
    /// never retried. Reservations are final: no release operation exists.
    fn reserve(
        &self,
        product_id: Uuid,
        requested_quantity: i32,
        caller: &Identity,
    ) -> Result<ProductView, DomainError>;
}

/// The inventory capability the order placement orchestrator depends on.
/// The HTTP call into the products service is one adapter; an in-process
/// call is another.
#[async_trait]
pub trait InventoryLedger: Send + Sync + 'static {
    async fn reserve(&self, product_id: Uuid, quantity: i32) -> Result<(), DomainError>;
}
