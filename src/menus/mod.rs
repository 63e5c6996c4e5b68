//! Demonstration menu tree
//!
//! `/` runs routines and leads to `/stocks/`, where a ticker is loaded
//! before entering `/stocks/dd/` to keep notes on it. No data provider is
//! involved.

pub mod dd;
pub mod root;
pub mod stocks;

pub use root::root_menu;
