// src/convert/mod.rs
//! Recursive conversion between dynamic values and runtime values
//!
//! Both directions walk the input structurally and count container depth
//! against [`BridgeConfig::max_depth`](crate::BridgeConfig), so hostile
//! nesting is reported as an error instead of exhausting the native stack.

pub mod export;
pub mod import;
pub mod path;

pub use export::Exporter;
pub use import::Importer;
pub use path::{PathSegment, ValuePath};
