//! Pure domain services.

mod resize_rules;

pub use resize_rules::{FULL_SCALE, ResizeRuleEngine};
