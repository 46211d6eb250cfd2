// src/runtime/mod.rs
//! The scripting runtime as seen by the bridge
//!
//! A [`Runtime`] is the live engine context. The bridge only needs the
//! primitive constructors and inspectors below; execution, collection and
//! object identity stay with the engine. [`memory::MemoryRuntime`] is a
//! small in-process engine implementing the trait.

pub mod kind;
pub mod memory;

use crate::RuntimeError;

pub use kind::ValueKind;
pub use memory::{JsValue, MemoryRuntime, ObjectRef};

/// Value construction and inspection offered by an embedded engine.
///
/// `Value` is a non-owning handle whose lifetime the engine governs. All
/// calls must happen on whatever thread the engine is confined to.
pub trait Runtime {
    type Value: Clone;

    fn undefined(&self) -> Self::Value;

    fn null(&self) -> Self::Value;

    fn boolean(&self, value: bool) -> Self::Value;

    /// Engines may reject numbers they cannot represent.
    fn number(&mut self, value: f64) -> Result<Self::Value, RuntimeError>;

    /// Build an engine string from UTF-8, re-encoding as the engine needs.
    fn string_from_utf8(&mut self, text: &str) -> Result<Self::Value, RuntimeError>;

    /// Allocate an array of `len` elements, each initially undefined.
    fn create_array(&mut self, len: usize) -> Result<Self::Value, RuntimeError>;

    fn create_object(&mut self) -> Result<Self::Value, RuntimeError>;

    fn set_index(
        &mut self,
        array: &Self::Value,
        index: usize,
        value: Self::Value,
    ) -> Result<(), RuntimeError>;

    fn set_property(
        &mut self,
        object: &Self::Value,
        key: &str,
        value: Self::Value,
    ) -> Result<(), RuntimeError>;

    fn kind_of(&self, value: &Self::Value) -> Result<ValueKind, RuntimeError>;

    fn as_boolean(&self, value: &Self::Value) -> Result<bool, RuntimeError>;

    fn as_number(&self, value: &Self::Value) -> Result<f64, RuntimeError>;

    /// Decode an engine string to UTF-8.
    fn string_to_utf8(&self, value: &Self::Value) -> Result<String, RuntimeError>;

    fn array_length(&self, array: &Self::Value) -> Result<usize, RuntimeError>;

    fn get_index(&self, array: &Self::Value, index: usize) -> Result<Self::Value, RuntimeError>;

    /// Own enumerable string-keyed property names, in engine order.
    fn own_enumerable_keys(&self, object: &Self::Value) -> Result<Vec<String>, RuntimeError>;

    fn get_property(&self, object: &Self::Value, key: &str) -> Result<Self::Value, RuntimeError>;

    /// Stable identity of an object-like value, if the engine exposes one.
    ///
    /// Export uses it to detect cycles. Engines returning `None` are only
    /// protected by the depth limit.
    fn identity(&self, _value: &Self::Value) -> Option<u64> {
        None
    }
}
