pub mod extractor;
pub mod token;

pub use extractor::BearerIdentity;
pub use token::{AuthError, TokenIssuer, TokenVerifier, ORDERS_AUDIENCE, PRODUCTS_AUDIENCE};
