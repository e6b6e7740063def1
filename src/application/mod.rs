pub mod catalog;
pub mod placement;

pub use catalog::ProductService;
pub use placement::OrderPlacementService;
