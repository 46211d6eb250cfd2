// src/dynamic/mod.rs
//! Generic dynamic values, the host side of the bridge

pub mod value;

pub use value::{Dynamic, MAX_SAFE_INTEGER};
