use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Seller,
    Buyer,
    OrderSrv,
}

/// The verified identity of a caller, as asserted by its token.
///
/// Session tokens carry a `user_id`; service-to-service tokens do not.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Option<Uuid>,
    pub role: Role,
}

impl Identity {
    pub fn user(user_id: Uuid, role: Role) -> Self {
        Identity {
            user_id: Some(user_id),
            role,
        }
    }

    pub fn service(role: Role) -> Self {
        Identity {
            user_id: None,
            role,
        }
    }
}
