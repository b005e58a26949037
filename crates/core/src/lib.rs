//! Core business logic for Stockledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All inventory domain types, validation rules, and costing calculations live here.
//!
//! # Modules
//!
//! - `inventory` - Movement types, balance keys, weighted-average costing,
//!   negative-stock policy, and operation planning

pub mod inventory;
