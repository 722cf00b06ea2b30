//! Core prediction logic
//!
//! Leaves first: `stations`, `geo`, `cities`, `features`, `model`,
//! then `source`, `warning` and the orchestrating `service`.

pub mod cities;
pub mod features;
pub mod geo;
pub mod model;
pub mod service;
pub mod source;
pub mod stations;
pub mod warning;
