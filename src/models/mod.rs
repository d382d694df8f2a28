//! Core data models for the organization finder.

pub mod organization;

pub use organization::{GeoPoint, OrganizationRecord, RankedResult};
