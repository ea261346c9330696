// ABOUTME: Schema module - typed parameter descriptors for remote tools.
// ABOUTME: Data-only replacement for per-tool generated argument types.

mod params;

pub use params::*;
