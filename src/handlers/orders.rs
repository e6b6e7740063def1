use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::BearerIdentity;
use crate::domain::identity::{Identity, Role};
use crate::domain::order::{OrderItemRequest, OrderView, PlacedOrder};
use crate::errors::AppError;
use crate::OrdersApp;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    /// Defaults to 1 when omitted.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RejectedItemResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    /// Items the inventory ledger refused; partial booking is an intended
    /// outcome, not an error.
    pub rejected_items: Vec<RejectedItemResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Maximum number of orders to return (1–100).
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            status: order.status.as_str().to_string(),
            created_at: order.created_at.to_rfc3339(),
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

impl From<PlacedOrder> for CreateOrderResponse {
    fn from(placed: PlacedOrder) -> Self {
        CreateOrderResponse {
            order: placed.order.into(),
            rejected_items: placed
                .rejected
                .into_iter()
                .map(|r| RejectedItemResponse {
                    product_id: r.product_id,
                    quantity: r.quantity,
                    reason: r.reason,
                })
                .collect(),
        }
    }
}

fn buyer_id(identity: &Identity) -> Result<Uuid, AppError> {
    identity.user_id.ok_or(AppError::InvalidToken)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order for the authenticated buyer. Every requested item is
/// booked independently against the products service; items that cannot be
/// reserved are reported in `rejected_items`. If nothing could be booked,
/// no order is created and the request fails with 409.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created, possibly partially booked", body = CreateOrderResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not a buyer"),
        (status = 409, description = "No item could be booked"),
        (status = 422, description = "Empty item list or non-positive quantity"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrdersApp>,
    identity: BearerIdentity,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    if identity.0.role != Role::Buyer {
        return Err(AppError::Forbidden("caller is not a buyer".to_string()));
    }
    let buyer = buyer_id(&identity.0)?;

    let items: Vec<OrderItemRequest> = body
        .into_inner()
        .items
        .into_iter()
        .map(|i| OrderItemRequest {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect();

    let placed = service.place_order(buyer, items).await?;
    Ok(HttpResponse::Created().json(CreateOrderResponse::from(placed)))
}

/// GET /orders/{id}
///
/// Returns the order with its items. Orders belonging to other buyers are
/// reported as 404, not 403.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Order not found or not visible to the caller"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrdersApp>,
    identity: BearerIdentity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let buyer = buyer_id(&identity.0)?;
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id, buyer))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Lists the authenticated buyer's orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(("limit" = Option<i64>, Query, description = "Maximum number of orders (1-100)")),
    responses(
        (status = 200, description = "The caller's orders", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<OrdersApp>,
    identity: BearerIdentity,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let buyer = buyer_id(&identity.0)?;
    let limit = query.into_inner().limit.map(|l| l.clamp(1, 100));

    let orders = web::block(move || service.list_orders(buyer, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}
