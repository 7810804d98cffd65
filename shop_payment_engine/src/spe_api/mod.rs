pub mod errors;
pub mod order_flow_api;
pub mod product_api;
