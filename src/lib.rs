//! NGO Finder - locate the organizations nearest to a point
//!
//! This library provides shared types and modules for the geocode, nearest
//! and serve binaries.

pub mod config;
pub mod dataset;
pub mod distance;
pub mod geocoder;
pub mod models;
pub mod pipeline;
pub mod ranking;
pub mod telemetry;

pub use models::{GeoPoint, OrganizationRecord, RankedResult};
