// src/runtime/memory.rs
//! In-process reference engine
//!
//! Objects live in an arena and are addressed by copyable handles, strings
//! are stored as UTF-16 code units the way JavaScript engines keep them.
//! Nothing is ever collected; the heap lives as long as the runtime. No
//! code is executed: functions and host objects are opaque values.

use crate::runtime::{Runtime, ValueKind};
use crate::RuntimeError;
use ahash::HashMap;

/// Handle to an object in a [`MemoryRuntime`] heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(u32);

impl ObjectRef {
    /// Returns the raw heap slot index backing this handle.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle to an interned UTF-16 string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef(u32);

/// Engine value. Every variant is `Copy`; heap data stays in the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(StringRef),
    Symbol(SymbolRef),
    BigInt(i64),
    Object(ObjectRef),
}

#[derive(Debug, Clone, Copy)]
struct Property {
    value: JsValue,
    enumerable: bool,
}

/// Own properties of a plain object, remembering insertion order
#[derive(Debug, Default)]
struct PropertyTable {
    order: Vec<String>,
    slots: HashMap<String, Property>,
}

impl PropertyTable {
    fn define(&mut self, key: &str, value: JsValue, enumerable: bool) {
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.value = value;
                slot.enumerable = enumerable;
            }
            None => {
                self.order.push(key.to_string());
                self.slots.insert(key.to_string(), Property { value, enumerable });
            }
        }
    }

    fn assign(&mut self, key: &str, value: JsValue) {
        match self.slots.get_mut(key) {
            Some(slot) => slot.value = value,
            None => self.define(key, value, true),
        }
    }

    fn get(&self, key: &str) -> JsValue {
        self.slots
            .get(key)
            .map(|p| p.value)
            .unwrap_or(JsValue::Undefined)
    }

    /// Integer-index keys ascending, then the rest in insertion order.
    fn enumerable_keys(&self) -> Vec<String> {
        let mut indices: Vec<(u32, &String)> = Vec::new();
        let mut named: Vec<&String> = Vec::new();

        for key in &self.order {
            if !self.slots.get(key).is_some_and(|p| p.enumerable) {
                continue;
            }
            match array_index(key) {
                Some(i) => indices.push((i, key)),
                None => named.push(key),
            }
        }

        indices.sort_by_key(|(i, _)| *i);
        indices
            .into_iter()
            .map(|(_, k)| k)
            .chain(named)
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Canonical array index: no sign, no leading zeros, below 2^32 - 1.
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|i| *i != u32::MAX)
}

#[derive(Debug)]
enum HeapObject {
    Plain(PropertyTable),
    Array(Vec<JsValue>),
    Function { name: String },
    Host { class: String },
}

impl HeapObject {
    fn kind(&self) -> ValueKind {
        match self {
            HeapObject::Plain(_) => ValueKind::Object,
            HeapObject::Array(_) => ValueKind::Array,
            HeapObject::Function { .. } => ValueKind::Function,
            HeapObject::Host { .. } => ValueKind::HostObject,
        }
    }
}

/// Arena-backed engine context
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    objects: Vec<HeapObject>,
    strings: Vec<Vec<u16>>,
    symbols: Vec<String>,
    allocation_limit: Option<usize>,
    allocations: usize,
    finite_numbers_only: bool,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runtime whose heap refuses allocations past `limit` objects and
    /// strings combined.
    pub fn with_allocation_limit(limit: usize) -> Self {
        Self {
            allocation_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Runtime that refuses NaN and infinities, like engines without
    /// IEEE-754 special values.
    pub fn with_finite_numbers_only() -> Self {
        Self {
            finite_numbers_only: true,
            ..Self::default()
        }
    }

    /// Objects and strings allocated so far
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn reserve(&mut self, what: &'static str) -> Result<(), RuntimeError> {
        if let Some(limit) = self.allocation_limit {
            if self.allocations >= limit {
                return Err(RuntimeError::AllocationFailed { what });
            }
        }
        self.allocations += 1;
        Ok(())
    }

    fn alloc_object(&mut self, object: HeapObject, what: &'static str) -> Result<JsValue, RuntimeError> {
        self.reserve(what)?;
        let handle = ObjectRef(self.objects.len() as u32);
        self.objects.push(object);
        Ok(JsValue::Object(handle))
    }

    fn heap_object(&self, value: &JsValue) -> Result<&HeapObject, RuntimeError> {
        match value {
            JsValue::Object(handle) => self
                .objects
                .get(handle.0 as usize)
                .ok_or(RuntimeError::InvalidHandle),
            other => Err(self.mismatch("object", other)),
        }
    }

    fn heap_object_mut(&mut self, value: &JsValue) -> Result<&mut HeapObject, RuntimeError> {
        match value {
            JsValue::Object(handle) => self
                .objects
                .get_mut(handle.0 as usize)
                .ok_or(RuntimeError::InvalidHandle),
            other => Err(self.mismatch("object", other)),
        }
    }

    fn mismatch(&self, expected: &'static str, value: &JsValue) -> RuntimeError {
        match self.kind_of(value) {
            Ok(found) => RuntimeError::TypeMismatch { expected, found },
            Err(e) => e,
        }
    }

    /// Allocate an opaque function value
    pub fn create_function(&mut self, name: impl Into<String>) -> Result<JsValue, RuntimeError> {
        self.alloc_object(HeapObject::Function { name: name.into() }, "function")
    }

    /// Allocate an opaque host object of the given class
    pub fn create_host_object(&mut self, class: impl Into<String>) -> Result<JsValue, RuntimeError> {
        self.alloc_object(HeapObject::Host { class: class.into() }, "host object")
    }

    pub fn create_symbol(&mut self, description: impl Into<String>) -> JsValue {
        let handle = SymbolRef(self.symbols.len() as u32);
        self.symbols.push(description.into());
        JsValue::Symbol(handle)
    }

    pub fn bigint(&self, value: i64) -> JsValue {
        JsValue::BigInt(value)
    }

    /// Build a string from raw UTF-16 code units, unpaired surrogates included
    pub fn string_from_utf16(&mut self, units: &[u16]) -> Result<JsValue, RuntimeError> {
        self.reserve("string")?;
        let handle = StringRef(self.strings.len() as u32);
        self.strings.push(units.to_vec());
        Ok(JsValue::String(handle))
    }

    /// Define or redefine an own property with an explicit enumerable flag
    pub fn define_property(
        &mut self,
        object: &JsValue,
        key: &str,
        value: JsValue,
        enumerable: bool,
    ) -> Result<(), RuntimeError> {
        let found = self.kind_of(object)?;
        match self.heap_object_mut(object)? {
            HeapObject::Plain(table) => {
                table.define(key, value, enumerable);
                Ok(())
            }
            _ => Err(RuntimeError::TypeMismatch { expected: "object", found }),
        }
    }

    /// Append to an array, growing it by one
    pub fn push(&mut self, array: &JsValue, value: JsValue) -> Result<(), RuntimeError> {
        let found = self.kind_of(array)?;
        match self.heap_object_mut(array)? {
            HeapObject::Array(elements) => {
                elements.push(value);
                Ok(())
            }
            _ => Err(RuntimeError::TypeMismatch { expected: "array", found }),
        }
    }

    /// Number of own properties, enumerable or not
    pub fn property_count(&self, object: &JsValue) -> Result<usize, RuntimeError> {
        match self.heap_object(object)? {
            HeapObject::Plain(table) => Ok(table.len()),
            _ => Err(self.mismatch("object", object)),
        }
    }

    /// Name of a function value
    pub fn function_name(&self, value: &JsValue) -> Result<&str, RuntimeError> {
        match self.heap_object(value)? {
            HeapObject::Function { name } => Ok(name.as_str()),
            _ => Err(self.mismatch("function", value)),
        }
    }

    /// Class of a host object
    pub fn host_class(&self, value: &JsValue) -> Result<&str, RuntimeError> {
        match self.heap_object(value)? {
            HeapObject::Host { class } => Ok(class.as_str()),
            _ => Err(self.mismatch("host object", value)),
        }
    }

    pub fn symbol_description(&self, value: &JsValue) -> Result<&str, RuntimeError> {
        match value {
            JsValue::Symbol(handle) => self
                .symbols
                .get(handle.0 as usize)
                .map(String::as_str)
                .ok_or(RuntimeError::InvalidHandle),
            other => Err(self.mismatch("symbol", other)),
        }
    }

    /// Result of the JavaScript `typeof` operator
    pub fn type_of(&self, value: &JsValue) -> Result<&'static str, RuntimeError> {
        Ok(match self.kind_of(value)? {
            ValueKind::Undefined => "undefined",
            ValueKind::Null | ValueKind::Array | ValueKind::Object | ValueKind::HostObject => "object",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Symbol => "symbol",
            ValueKind::BigInt => "bigint",
            ValueKind::Function => "function",
        })
    }
}

impl Runtime for MemoryRuntime {
    type Value = JsValue;

    fn undefined(&self) -> JsValue {
        JsValue::Undefined
    }

    fn null(&self) -> JsValue {
        JsValue::Null
    }

    fn boolean(&self, value: bool) -> JsValue {
        JsValue::Bool(value)
    }

    fn number(&mut self, value: f64) -> Result<JsValue, RuntimeError> {
        if self.finite_numbers_only && !value.is_finite() {
            return Err(RuntimeError::UnrepresentableNumber(value));
        }
        Ok(JsValue::Number(value))
    }

    fn string_from_utf8(&mut self, text: &str) -> Result<JsValue, RuntimeError> {
        self.reserve("string")?;
        let handle = StringRef(self.strings.len() as u32);
        self.strings.push(text.encode_utf16().collect());
        Ok(JsValue::String(handle))
    }

    fn create_array(&mut self, len: usize) -> Result<JsValue, RuntimeError> {
        self.alloc_object(HeapObject::Array(vec![JsValue::Undefined; len]), "array")
    }

    fn create_object(&mut self) -> Result<JsValue, RuntimeError> {
        self.alloc_object(HeapObject::Plain(PropertyTable::default()), "object")
    }

    fn set_index(&mut self, array: &JsValue, index: usize, value: JsValue) -> Result<(), RuntimeError> {
        let found = self.kind_of(array)?;
        match self.heap_object_mut(array)? {
            HeapObject::Array(elements) => {
                let len = elements.len();
                let slot = elements
                    .get_mut(index)
                    .ok_or(RuntimeError::IndexOutOfBounds { index, len })?;
                *slot = value;
                Ok(())
            }
            _ => Err(RuntimeError::TypeMismatch { expected: "array", found }),
        }
    }

    fn set_property(&mut self, object: &JsValue, key: &str, value: JsValue) -> Result<(), RuntimeError> {
        let found = self.kind_of(object)?;
        match self.heap_object_mut(object)? {
            HeapObject::Plain(table) => {
                table.assign(key, value);
                Ok(())
            }
            _ => Err(RuntimeError::TypeMismatch { expected: "object", found }),
        }
    }

    fn kind_of(&self, value: &JsValue) -> Result<ValueKind, RuntimeError> {
        Ok(match value {
            JsValue::Undefined => ValueKind::Undefined,
            JsValue::Null => ValueKind::Null,
            JsValue::Bool(_) => ValueKind::Bool,
            JsValue::Number(_) => ValueKind::Number,
            JsValue::String(handle) => {
                if handle.0 as usize >= self.strings.len() {
                    return Err(RuntimeError::InvalidHandle);
                }
                ValueKind::String
            }
            JsValue::Symbol(_) => ValueKind::Symbol,
            JsValue::BigInt(_) => ValueKind::BigInt,
            JsValue::Object(handle) => self
                .objects
                .get(handle.0 as usize)
                .ok_or(RuntimeError::InvalidHandle)?
                .kind(),
        })
    }

    fn as_boolean(&self, value: &JsValue) -> Result<bool, RuntimeError> {
        match value {
            JsValue::Bool(b) => Ok(*b),
            other => Err(self.mismatch("boolean", other)),
        }
    }

    fn as_number(&self, value: &JsValue) -> Result<f64, RuntimeError> {
        match value {
            JsValue::Number(n) => Ok(*n),
            other => Err(self.mismatch("number", other)),
        }
    }

    /// Unpaired surrogates decode to U+FFFD.
    fn string_to_utf8(&self, value: &JsValue) -> Result<String, RuntimeError> {
        match value {
            JsValue::String(handle) => self
                .strings
                .get(handle.0 as usize)
                .map(|units| String::from_utf16_lossy(units))
                .ok_or(RuntimeError::InvalidHandle),
            other => Err(self.mismatch("string", other)),
        }
    }

    fn array_length(&self, array: &JsValue) -> Result<usize, RuntimeError> {
        match self.heap_object(array)? {
            HeapObject::Array(elements) => Ok(elements.len()),
            _ => Err(self.mismatch("array", array)),
        }
    }

    fn get_index(&self, array: &JsValue, index: usize) -> Result<JsValue, RuntimeError> {
        match self.heap_object(array)? {
            HeapObject::Array(elements) => elements.get(index).copied().ok_or(
                RuntimeError::IndexOutOfBounds {
                    index,
                    len: elements.len(),
                },
            ),
            _ => Err(self.mismatch("array", array)),
        }
    }

    fn own_enumerable_keys(&self, object: &JsValue) -> Result<Vec<String>, RuntimeError> {
        match self.heap_object(object)? {
            HeapObject::Plain(table) => Ok(table.enumerable_keys()),
            HeapObject::Array(elements) => Ok((0..elements.len()).map(|i| i.to_string()).collect()),
            HeapObject::Function { .. } | HeapObject::Host { .. } => Ok(Vec::new()),
        }
    }

    fn get_property(&self, object: &JsValue, key: &str) -> Result<JsValue, RuntimeError> {
        match self.heap_object(object)? {
            HeapObject::Plain(table) => Ok(table.get(key)),
            HeapObject::Array(elements) => Ok(array_index(key)
                .and_then(|i| elements.get(i as usize).copied())
                .unwrap_or(JsValue::Undefined)),
            HeapObject::Function { .. } | HeapObject::Host { .. } => Ok(JsValue::Undefined),
        }
    }

    fn identity(&self, value: &JsValue) -> Option<u64> {
        match value {
            JsValue::Object(handle) => Some(handle.0 as u64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_order() {
        let mut rt = MemoryRuntime::new();
        let obj = rt.create_object().unwrap();

        for key in ["zeta", "10", "alpha", "2", "01"] {
            rt.set_property(&obj, key, JsValue::Null).unwrap();
        }

        let keys = rt.own_enumerable_keys(&obj).unwrap();
        assert_eq!(keys, vec!["2", "10", "zeta", "alpha", "01"]);
    }

    #[test]
    fn test_non_enumerable_properties_are_hidden() {
        let mut rt = MemoryRuntime::new();
        let obj = rt.create_object().unwrap();

        rt.set_property(&obj, "visible", JsValue::Bool(true)).unwrap();
        rt.define_property(&obj, "hidden", JsValue::Bool(false), false).unwrap();

        assert_eq!(rt.own_enumerable_keys(&obj).unwrap(), vec!["visible"]);
        assert_eq!(rt.property_count(&obj).unwrap(), 2);
        assert_eq!(rt.get_property(&obj, "hidden").unwrap(), JsValue::Bool(false));
    }

    #[test]
    fn test_assign_keeps_position() {
        let mut rt = MemoryRuntime::new();
        let obj = rt.create_object().unwrap();

        rt.set_property(&obj, "a", JsValue::Number(1.0)).unwrap();
        rt.set_property(&obj, "b", JsValue::Number(2.0)).unwrap();
        rt.set_property(&obj, "a", JsValue::Number(3.0)).unwrap();

        assert_eq!(rt.own_enumerable_keys(&obj).unwrap(), vec!["a", "b"]);
        assert_eq!(rt.get_property(&obj, "a").unwrap(), JsValue::Number(3.0));
    }

    #[test]
    fn test_strings_are_utf16() {
        let mut rt = MemoryRuntime::new();
        let s = rt.string_from_utf8("héllo 🦀").unwrap();
        assert_eq!(rt.string_to_utf8(&s).unwrap(), "héllo 🦀");

        let lone = rt.string_from_utf16(&[0x61, 0xD800]).unwrap();
        assert_eq!(rt.string_to_utf8(&lone).unwrap(), "a\u{FFFD}");
    }

    #[test]
    fn test_array_bounds() {
        let mut rt = MemoryRuntime::new();
        let arr = rt.create_array(2).unwrap();

        assert_eq!(rt.get_index(&arr, 1).unwrap(), JsValue::Undefined);
        assert_eq!(
            rt.set_index(&arr, 2, JsValue::Null),
            Err(RuntimeError::IndexOutOfBounds { index: 2, len: 2 })
        );

        rt.push(&arr, JsValue::Bool(true)).unwrap();
        assert_eq!(rt.array_length(&arr).unwrap(), 3);
    }

    #[test]
    fn test_allocation_limit() {
        let mut rt = MemoryRuntime::with_allocation_limit(2);

        rt.create_object().unwrap();
        rt.string_from_utf8("x").unwrap();
        assert_eq!(
            rt.create_array(0),
            Err(RuntimeError::AllocationFailed { what: "array" })
        );
        assert_eq!(rt.allocations(), 2);
    }

    #[test]
    fn test_finite_numbers_only() {
        let mut rt = MemoryRuntime::with_finite_numbers_only();

        assert_eq!(rt.number(1.5).unwrap(), JsValue::Number(1.5));
        assert_eq!(
            rt.number(f64::INFINITY),
            Err(RuntimeError::UnrepresentableNumber(f64::INFINITY))
        );
        assert!(matches!(
            rt.number(f64::NAN),
            Err(RuntimeError::UnrepresentableNumber(n)) if n.is_nan()
        ));
        assert!(MemoryRuntime::new().number(f64::NAN).is_ok());
    }

    #[test]
    fn test_type_mismatch_reports_kind() {
        let mut rt = MemoryRuntime::new();
        let f = rt.create_function("handler").unwrap();

        assert_eq!(
            rt.set_property(&f, "x", JsValue::Null),
            Err(RuntimeError::TypeMismatch {
                expected: "object",
                found: ValueKind::Function
            })
        );
        assert_eq!(rt.function_name(&f).unwrap(), "handler");
        assert!(matches!(
            rt.as_number(&JsValue::Bool(true)),
            Err(RuntimeError::TypeMismatch { found: ValueKind::Bool, .. })
        ));
    }

    #[test]
    fn test_foreign_handle_is_invalid() {
        let mut a = MemoryRuntime::new();
        let b = MemoryRuntime::new();
        let obj = a.create_object().unwrap();

        assert_eq!(b.kind_of(&obj), Err(RuntimeError::InvalidHandle));
    }

    #[test]
    fn test_type_of() {
        let mut rt = MemoryRuntime::new();
        let host = rt.create_host_object("Window").unwrap();
        let sym = rt.create_symbol("tag");

        assert_eq!(rt.type_of(&JsValue::Null).unwrap(), "object");
        assert_eq!(rt.type_of(&host).unwrap(), "object");
        assert_eq!(rt.type_of(&sym).unwrap(), "symbol");
        assert_eq!(rt.type_of(&rt.bigint(5)).unwrap(), "bigint");
        assert_eq!(rt.host_class(&host).unwrap(), "Window");
        assert_eq!(rt.symbol_description(&sym).unwrap(), "tag");
    }
}
