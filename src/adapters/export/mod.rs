//! Report exporters.

mod json_bundle;

pub use json_bundle::JsonBundleExporter;
