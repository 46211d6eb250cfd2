// src/lib.rs
//! # dyn-bridge
//!
//! Moves structured data across the boundary between a host program and an
//! embedded scripting engine. Host data is a [`Dynamic`] value; engine data
//! is whatever handle type the engine's [`Runtime`] implementation exposes.
//!
//! - **Import** turns a [`Dynamic`] into a fresh engine value.
//! - **Export** snapshots an engine value back into a [`Dynamic`].
//!
//! Both directions are synchronous, recursive and fail whole: an error
//! anywhere aborts the conversion and nothing partial is returned.
//!
//! ## Example
//!
//! ```rust
//! use dyn_bridge::{Bridge, Dynamic, MemoryRuntime, Runtime, ValueKind};
//!
//! let mut rt = MemoryRuntime::new();
//! let bridge = Bridge::new();
//!
//! let payload = Dynamic::object()
//!     .with_field("a", vec![Dynamic::from(1), Dynamic::from(2), Dynamic::object().with_field("b", true)]);
//!
//! let value = bridge.import(&mut rt, &payload).unwrap();
//! assert_eq!(rt.kind_of(&value).unwrap(), ValueKind::Object);
//!
//! let back = bridge.export(&rt, &value).unwrap();
//! assert_eq!(back, payload);
//! ```

pub mod config;
pub mod convert;
pub mod dynamic;
pub mod runtime;

use thiserror::Error;

pub use config::BridgeConfig;
pub use convert::path::{PathSegment, ValuePath};
pub use dynamic::Dynamic;
pub use runtime::{JsValue, MemoryRuntime, ObjectRef, Runtime, ValueKind};

/// Failures reported by a runtime's primitive operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("allocation failed for {what}")]
    AllocationFailed { what: &'static str },

    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: ValueKind,
    },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("value handle does not belong to this runtime")]
    InvalidHandle,

    #[error("number {0} is not representable")]
    UnrepresentableNumber(f64),
}

/// Errors that abort an import or export
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("integer {value} at {path} is not exactly representable as a double")]
    NumberOutOfRange { value: i64, path: ValuePath },

    #[error("runtime failure at {path}: {source}")]
    Runtime {
        #[source]
        source: RuntimeError,
        path: ValuePath,
    },

    #[error("nesting exceeds {limit} levels at {path}")]
    DepthLimitExceeded { limit: usize, path: ValuePath },

    #[error("cyclic reference at {path}")]
    CycleDetected { path: ValuePath },
}

impl ConversionError {
    /// Location of the offending value
    pub fn path(&self) -> &ValuePath {
        match self {
            ConversionError::NumberOutOfRange { path, .. }
            | ConversionError::Runtime { path, .. }
            | ConversionError::DepthLimitExceeded { path, .. }
            | ConversionError::CycleDetected { path } => path,
        }
    }

    /// Whether the runtime refused to allocate
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            ConversionError::Runtime {
                source: RuntimeError::AllocationFailed { .. },
                ..
            }
        )
    }

    pub(crate) fn within(mut self, segment: PathSegment) -> Self {
        match &mut self {
            ConversionError::NumberOutOfRange { path, .. }
            | ConversionError::Runtime { path, .. }
            | ConversionError::DepthLimitExceeded { path, .. }
            | ConversionError::CycleDetected { path } => path.prepend(segment),
        }
        self
    }
}

impl From<RuntimeError> for ConversionError {
    fn from(source: RuntimeError) -> Self {
        ConversionError::Runtime {
            source,
            path: ValuePath::root(),
        }
    }
}

/// An engine value with no dynamic-value equivalent
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot export {kind} value at {path}")]
pub struct UnsupportedTypeError {
    pub kind: ValueKind,
    pub path: ValuePath,
}

/// Errors from [`Bridge::export`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedTypeError),
}

impl ExportError {
    pub fn path(&self) -> &ValuePath {
        match self {
            ExportError::Conversion(e) => e.path(),
            ExportError::Unsupported(e) => &e.path,
        }
    }

    pub(crate) fn within(self, segment: PathSegment) -> Self {
        match self {
            ExportError::Conversion(e) => ExportError::Conversion(e.within(segment)),
            ExportError::Unsupported(mut e) => {
                e.path.prepend(segment);
                ExportError::Unsupported(e)
            }
        }
    }
}

impl From<RuntimeError> for ExportError {
    fn from(source: RuntimeError) -> Self {
        ExportError::Conversion(source.into())
    }
}

/// Errors loading a [`BridgeConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Converter between [`Dynamic`] values and runtime values
///
/// Holds only configuration; the runtime context is passed into every
/// call, so one bridge can serve any number of runtimes.
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    config: BridgeConfig,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge with custom limits
    ///
    /// # Example
    ///
    /// ```rust
    /// use dyn_bridge::{Bridge, BridgeConfig};
    ///
    /// let config = BridgeConfig::from_json(r#"{"max_depth": 64}"#).unwrap();
    /// let bridge = Bridge::with_config(config).unwrap();
    /// assert_eq!(bridge.config().max_depth, 64);
    /// ```
    pub fn with_config(config: BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Convert a dynamic value into a newly allocated runtime value
    pub fn import<R: Runtime>(
        &self,
        runtime: &mut R,
        value: &Dynamic,
    ) -> Result<R::Value, ConversionError> {
        convert::import::Importer::new(runtime, &self.config).run(value)
    }

    /// Snapshot a runtime value as a dynamic value
    pub fn export<R: Runtime>(&self, runtime: &R, value: &R::Value) -> Result<Dynamic, ExportError> {
        convert::export::Exporter::new(runtime, &self.config).run(value)
    }
}

/// [`Bridge::import`] with default settings
pub fn import<R: Runtime>(runtime: &mut R, value: &Dynamic) -> Result<R::Value, ConversionError> {
    Bridge::new().import(runtime, value)
}

/// [`Bridge::export`] with default settings
pub fn export<R: Runtime>(runtime: &R, value: &R::Value) -> Result<Dynamic, ExportError> {
    Bridge::new().export(runtime, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_paths_prepend() {
        let err = ConversionError::CycleDetected {
            path: ValuePath::root(),
        }
        .within(PathSegment::Index(0))
        .within(PathSegment::Key("items".to_string()));

        assert_eq!(err.path().to_string(), "$.items[0]");
        assert_eq!(err.to_string(), "cyclic reference at $.items[0]");
    }

    #[test]
    fn test_allocation_failure_flag() {
        let err = ConversionError::from(RuntimeError::AllocationFailed { what: "object" });
        assert!(err.is_allocation_failure());
        assert!(err.path().is_root());
    }

    #[test]
    fn test_unsupported_message() {
        let err = ExportError::from(UnsupportedTypeError {
            kind: ValueKind::Function,
            path: ValuePath::root(),
        })
        .within(PathSegment::Key("onClick".to_string()));

        assert_eq!(err.to_string(), "cannot export function value at $.onClick");
    }

    #[test]
    fn test_bridge_rejects_invalid_config() {
        let result = Bridge::with_config(BridgeConfig::default().with_max_depth(0));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
