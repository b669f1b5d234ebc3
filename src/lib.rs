//! Dashboard Exporter - Access-filtered report aggregation
//!
//! This crate resolves which workplaces a caller may see, fans out to report
//! producers once per requested report, and assembles an ordered bundle of
//! output files ready for export.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
