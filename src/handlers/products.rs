use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::BearerIdentity;
use crate::domain::product::{NewProduct, ProductStatus, ProductUpdate, ProductView};
use crate::errors::AppError;
use crate::ProductsApp;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    /// Initial stock; defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: String,
    pub description: String,
    pub quantity: i32,
    /// "ACTIVE" or "INACTIVE"; omitted keeps the current status.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub quantity: i32,
    pub created_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyParams {
    pub order_quantity: i32,
}

impl From<ProductView> for ProductResponse {
    fn from(p: ProductView) -> Self {
        ProductResponse {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            description: p.description,
            status: p.status.as_str().to_string(),
            quantity: p.quantity,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /products
///
/// Lists a new product for the authenticated seller. The listing starts
/// ACTIVE.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not a seller"),
    ),
    tag = "products"
)]
pub async fn create_product(
    service: web::Data<ProductsApp>,
    identity: BearerIdentity,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = identity.0;
    let body = body.into_inner();

    let product = web::block(move || {
        service.create_product(
            &caller,
            NewProduct {
                title: body.title,
                description: body.description,
                quantity: body.quantity.unwrap_or(1),
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
///
/// Owner-only update of title, description, quantity, and status. There is
/// no delete: setting status INACTIVE delists the product.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not a seller or not the owner"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    service: web::Data<ProductsApp>,
    identity: BearerIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = identity.0;
    let product_id = path.into_inner();
    let body = body.into_inner();

    let status = body
        .status
        .map(|s| {
            ProductStatus::parse(&s)
                .ok_or_else(|| AppError::Validation(format!("unknown status '{}'", s)))
        })
        .transpose()?;

    let product = web::block(move || {
        service.update_product(
            &caller,
            product_id,
            ProductUpdate {
                title: body.title,
                description: body.description,
                quantity: body.quantity,
                status,
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /products/{id}/buy?order_quantity=N
///
/// Internal reservation endpoint used by the orders service. Requires a
/// bearer token with role ORDER_SRV; atomically decrements stock or reports
/// 409 naming available vs requested quantity.
#[utoipa::path(
    post,
    path = "/products/{id}/buy",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
        ("order_quantity" = i32, Query, description = "Units to reserve"),
    ),
    responses(
        (status = 200, description = "Stock reserved"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller role is not ORDER_SRV"),
        (status = 404, description = "Product missing or inactive"),
        (status = 409, description = "Insufficient stock or reservation race lost"),
    ),
    tag = "products"
)]
pub async fn buy_product(
    service: web::Data<ProductsApp>,
    identity: BearerIdentity,
    path: web::Path<Uuid>,
    query: web::Query<BuyParams>,
) -> Result<HttpResponse, AppError> {
    let caller = identity.0;
    let product_id = path.into_inner();
    let quantity = query.into_inner().order_quantity;

    web::block(move || service.reserve(&caller, product_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({})))
}
