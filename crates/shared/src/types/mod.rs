//! Common types used across the application.

pub mod amount;
pub mod id;

pub use amount::{
    AMOUNT_DECIMAL_PLACES, AMOUNT_LIMIT, BALANCE_TOLERANCE, COST_DECIMAL_PLACES, RATE_DECIMAL_PLACES,
    RATE_LIMIT, amounts_match, fits_amount, fits_rate, round_cost,
};
pub use id::*;
