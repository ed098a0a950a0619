//! Order domain: entities, status state machine and pricing

pub mod pricing;
pub mod status;
pub mod types;

pub use pricing::{
    LineRequest, MAX_LINE_QUANTITY, PricedLine, PricedOrder, initial_status, price_lines,
    totals_consistent, validate_quantity,
};
pub use status::{TransitionPolicy, parse_status};
pub use types::*;
