use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::identity::{Identity, Role};
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, ProductUpdate, ProductView};

/// Seller-facing catalog operations plus the reservation entry point used
/// by the orders service.
pub struct ProductService<R> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_product(
        &self,
        caller: &Identity,
        product: NewProduct,
    ) -> Result<ProductView, DomainError> {
        if caller.role != Role::Seller {
            return Err(DomainError::Forbidden("caller is not a seller".to_string()));
        }
        let owner_id = caller
            .user_id
            .ok_or_else(|| DomainError::Forbidden("session token required".to_string()))?;
        if product.quantity < 0 {
            return Err(DomainError::InvalidInput(
                "quantity may not be negative".to_string(),
            ));
        }
        self.repo.create(owner_id, product)
    }

    /// Sellers may change title, description, quantity, and status of their
    /// own listings. Deletion is unsupported; delisting sets status INACTIVE.
    pub fn update_product(
        &self,
        caller: &Identity,
        product_id: Uuid,
        changes: ProductUpdate,
    ) -> Result<ProductView, DomainError> {
        if caller.role != Role::Seller {
            return Err(DomainError::Forbidden("caller is not a seller".to_string()));
        }
        let caller_id = caller
            .user_id
            .ok_or_else(|| DomainError::Forbidden("session token required".to_string()))?;
        if changes.quantity < 0 {
            return Err(DomainError::InvalidInput(
                "quantity may not be negative".to_string(),
            ));
        }

        let product = self.repo.find_by_id(product_id)?.ok_or(DomainError::NotFound)?;
        if product.user_id != caller_id {
            return Err(DomainError::Forbidden(
                "caller is not the owner of the product".to_string(),
            ));
        }

        self.repo.update(product_id, changes)
    }

    pub fn reserve(
        &self,
        caller: &Identity,
        product_id: Uuid,
        requested_quantity: i32,
    ) -> Result<ProductView, DomainError> {
        if requested_quantity < 1 {
            return Err(DomainError::InvalidInput(
                "order_quantity must be positive".to_string(),
            ));
        }
        self.repo.reserve(product_id, requested_quantity, caller)
    }
}
