use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderItemRequest, OrderView, PlacedOrder, RejectedItem};
use crate::domain::ports::{InventoryLedger, OrderRepository};

/// The order placement orchestrator.
///
/// Every requested item is attempted independently against the inventory
/// ledger; a failed item is dropped, not retried, and does not abort the
/// remaining items. Reservations already granted for earlier items cannot
/// be rolled back when a later one fails, so partial booking is a
/// first-class outcome. Inventory is always reserved before the order is
/// persisted, never the other way around.
pub struct OrderPlacementService<L, R> {
    ledger: L,
    repo: Arc<R>,
}

impl<L: InventoryLedger, R: OrderRepository> OrderPlacementService<L, R> {
    pub fn new(ledger: L, repo: R) -> Self {
        Self {
            ledger,
            repo: Arc::new(repo),
        }
    }

    pub async fn place_order(
        &self,
        buyer_id: Uuid,
        items: Vec<OrderItemRequest>,
    ) -> Result<PlacedOrder, DomainError> {
        if items.is_empty() {
            return Err(DomainError::InvalidInput(
                "an order needs at least one item".to_string(),
            ));
        }
        if let Some(item) = items.iter().find(|i| i.quantity < 1) {
            return Err(DomainError::InvalidInput(format!(
                "quantity must be positive for product {}",
                item.product_id
            )));
        }

        let mut booked = Vec::new();
        let mut rejected = Vec::new();
        for item in items {
            match self.ledger.reserve(item.product_id, item.quantity).await {
                Ok(()) => booked.push(item),
                Err(e) => {
                    log::warn!(
                        "could not book {} x{}: {}",
                        item.product_id,
                        item.quantity,
                        e
                    );
                    rejected.push(RejectedItem {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if booked.is_empty() {
            return Err(DomainError::NothingBooked);
        }

        // The repository is synchronous diesel; hop to the blocking pool so
        // the insert does not stall the executor thread.
        let repo = Arc::clone(&self.repo);
        let order = tokio::task::spawn_blocking(move || repo.add(buyer_id, booked))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))??;
        Ok(PlacedOrder { order, rejected })
    }

    pub fn get_order(&self, order_id: Uuid, user_id: Uuid) -> Result<OrderView, DomainError> {
        self.repo
            .find_by_id(order_id, user_id)?
            .ok_or(DomainError::NotFound)
    }

    pub fn list_orders(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list(user_id, limit)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use uuid::Uuid;

    use super::*;
    use crate::domain::order::{OrderItemView, OrderStatus};
    use crate::domain::ports::{InventoryLedger, OrderRepository};

    /// Ledger stub backed by a stock map; mirrors the real ledger's error
    /// taxonomy without a database.
    struct StubLedger {
        stock: Mutex<HashMap<Uuid, i32>>,
    }

    impl StubLedger {
        fn with_stock(entries: &[(Uuid, i32)]) -> Self {
            StubLedger {
                stock: Mutex::new(entries.iter().copied().collect()),
            }
        }

        fn remaining(&self, product_id: Uuid) -> i32 {
            *self.stock.lock().unwrap().get(&product_id).unwrap()
        }
    }

    #[async_trait]
    impl InventoryLedger for StubLedger {
        async fn reserve(&self, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
            let mut stock = self.stock.lock().unwrap();
            let available = stock.get_mut(&product_id).ok_or(DomainError::NotFound)?;
            if *available < quantity {
                return Err(DomainError::insufficient_stock(*available, quantity));
            }
            *available -= quantity;
            Ok(())
        }
    }

    /// In-memory order store recording what the orchestrator persists.
    #[derive(Default)]
    struct StubRepo {
        orders: Mutex<Vec<OrderView>>,
    }

    impl OrderRepository for StubRepo {
        fn add(
            &self,
            user_id: Uuid,
            items: Vec<OrderItemRequest>,
        ) -> Result<OrderView, DomainError> {
            let now = Utc::now();
            let order = OrderView {
                id: Uuid::new_v4(),
                user_id,
                status: OrderStatus::Created,
                created_at: now,
                updated_at: now,
                items: items
                    .into_iter()
                    .map(|i| OrderItemView {
                        id: Uuid::new_v4(),
                        product_id: i.product_id,
                        quantity: i.quantity,
                    })
                    .collect(),
            };
            self.orders.lock().unwrap().push(order.clone());
            Ok(order)
        }

        fn find_by_id(
            &self,
            order_id: Uuid,
            user_id: Uuid,
        ) -> Result<Option<OrderView>, DomainError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == order_id && o.user_id == user_id)
                .cloned())
        }

        fn list(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<OrderView>, DomainError> {
            let orders = self.orders.lock().unwrap();
            let mut result: Vec<OrderView> = orders
                .iter()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect();
            if let Some(limit) = limit {
                result.truncate(limit as usize);
            }
            Ok(result)
        }
    }

    fn item(product_id: Uuid, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn partial_booking_keeps_only_reserved_items() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let ledger = StubLedger::with_stock(&[(p1, 5), (p2, 0)]);
        let service = OrderPlacementService::new(ledger, StubRepo::default());
        let buyer = Uuid::new_v4();

        let placed = service
            .place_order(buyer, vec![item(p1, 3), item(p2, 10)])
            .await
            .expect("placement should succeed on partial booking");

        assert_eq!(placed.order.status, OrderStatus::Created);
        assert_eq!(placed.order.items.len(), 1);
        assert_eq!(placed.order.items[0].product_id, p1);
        assert_eq!(placed.order.items[0].quantity, 3);

        assert_eq!(placed.rejected.len(), 1);
        assert_eq!(placed.rejected[0].product_id, p2);
        assert!(placed.rejected[0].reason.contains("Insufficient"));

        assert_eq!(service.ledger.remaining(p1), 2);
        assert_eq!(service.ledger.remaining(p2), 0);
    }

    #[tokio::test]
    async fn nothing_booked_persists_no_order() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let ledger = StubLedger::with_stock(&[(p1, 0), (p2, 0)]);
        let service = OrderPlacementService::new(ledger, StubRepo::default());
        let buyer = Uuid::new_v4();

        let err = service
            .place_order(buyer, vec![item(p1, 1), item(p2, 2)])
            .await
            .expect_err("should fail when nothing can be booked");

        assert!(matches!(err, DomainError::NothingBooked));
        assert!(service.repo.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_rejected_not_fatal() {
        let p1 = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let ledger = StubLedger::with_stock(&[(p1, 2)]);
        let service = OrderPlacementService::new(ledger, StubRepo::default());

        let placed = service
            .place_order(Uuid::new_v4(), vec![item(missing, 1), item(p1, 2)])
            .await
            .expect("the in-stock item should still be booked");

        assert_eq!(placed.order.items.len(), 1);
        assert_eq!(placed.order.items[0].product_id, p1);
        assert_eq!(placed.rejected[0].product_id, missing);
    }

    #[tokio::test]
    async fn empty_item_list_is_invalid_input() {
        let service =
            OrderPlacementService::new(StubLedger::with_stock(&[]), StubRepo::default());

        let err = service
            .place_order(Uuid::new_v4(), vec![])
            .await
            .expect_err("empty orders are invalid");
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_invalid_input() {
        let p1 = Uuid::new_v4();
        let ledger = StubLedger::with_stock(&[(p1, 5)]);
        let service = OrderPlacementService::new(ledger, StubRepo::default());

        let err = service
            .place_order(Uuid::new_v4(), vec![item(p1, 0)])
            .await
            .expect_err("zero quantity is invalid");
        assert!(matches!(err, DomainError::InvalidInput(_)));
        // Nothing was reserved before validation failed.
        assert_eq!(service.ledger.remaining(p1), 5);
    }

    #[tokio::test]
    async fn persisting_the_order_does_not_stall_the_executor() {
        /// Repo whose insert takes as long as a slow database round-trip.
        struct SlowRepo {
            inner: StubRepo,
        }

        impl OrderRepository for SlowRepo {
            fn add(
                &self,
                user_id: Uuid,
                items: Vec<OrderItemRequest>,
            ) -> Result<OrderView, DomainError> {
                std::thread::sleep(Duration::from_millis(200));
                self.inner.add(user_id, items)
            }

            fn find_by_id(
                &self,
                order_id: Uuid,
                user_id: Uuid,
            ) -> Result<Option<OrderView>, DomainError> {
                self.inner.find_by_id(order_id, user_id)
            }

            fn list(
                &self,
                user_id: Uuid,
                limit: Option<i64>,
            ) -> Result<Vec<OrderView>, DomainError> {
                self.inner.list(user_id, limit)
            }
        }

        let p1 = Uuid::new_v4();
        let ledger = StubLedger::with_stock(&[(p1, 5)]);
        let service = OrderPlacementService::new(
            ledger,
            SlowRepo {
                inner: StubRepo::default(),
            },
        );

        // On this single-threaded runtime the timer can only fire while the
        // slow insert runs on the blocking pool rather than the executor.
        let started = Instant::now();
        let ticker = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            started.elapsed()
        });

        let placed = service
            .place_order(Uuid::new_v4(), vec![item(p1, 1)])
            .await
            .expect("placement failed");
        assert_eq!(placed.order.items.len(), 1);

        let ticked_after = ticker.await.unwrap();
        assert!(
            ticked_after < Duration::from_millis(150),
            "timer fired after {:?}; the order insert held the executor thread",
            ticked_after
        );
    }

    #[tokio::test]
    async fn get_order_scopes_to_owner() {
        let p1 = Uuid::new_v4();
        let ledger = StubLedger::with_stock(&[(p1, 5)]);
        let service = OrderPlacementService::new(ledger, StubRepo::default());
        let buyer_a = Uuid::new_v4();
        let buyer_b = Uuid::new_v4();

        let placed = service
            .place_order(buyer_a, vec![item(p1, 1)])
            .await
            .expect("placement failed");

        assert!(service.get_order(placed.order.id, buyer_a).is_ok());
        assert!(matches!(
            service.get_order(placed.order.id, buyer_b),
            Err(DomainError::NotFound)
        ));
    }
}
