//! Sizers: turn capital into a per-round budget and the budget into shares.
//!
//! Both calculations are total functions: a zero split count or a non-positive
//! price yields 0 instead of an error.

pub mod base;
pub mod budget;

pub use base::{base_quantity, base_quantity_with_floor, floor_shares};
pub use budget::{allocate, resolve_budget};
