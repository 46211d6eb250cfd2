// src/convert/import.rs
//! Dynamic value -> runtime value

use crate::convert::path::{PathSegment, ValuePath};
use crate::dynamic::{Dynamic, MAX_SAFE_INTEGER};
use crate::runtime::Runtime;
use crate::{BridgeConfig, ConversionError};
use ahash::HashMap;
use tracing::{debug, trace, warn};

/// One import call. Every composite input gets a freshly allocated
/// runtime object; nothing is shared or memoized.
pub struct Importer<'r, R: Runtime> {
    runtime: &'r mut R,
    config: &'r BridgeConfig,
    containers: usize,
}

impl<'r, R: Runtime> Importer<'r, R> {
    pub fn new(runtime: &'r mut R, config: &'r BridgeConfig) -> Self {
        Self {
            runtime,
            config,
            containers: 0,
        }
    }

    pub fn run(mut self, value: &Dynamic) -> Result<R::Value, ConversionError> {
        debug!(kind = value.type_name(), "importing dynamic value");

        match self.import_value(value, 0) {
            Ok(imported) => {
                debug!(containers = self.containers, "import complete");
                Ok(imported)
            }
            Err(e) => {
                warn!(error = %e, "import aborted");
                Err(e)
            }
        }
    }

    /// `depth` is the number of containers enclosing `value`
    fn import_value(&mut self, value: &Dynamic, depth: usize) -> Result<R::Value, ConversionError> {
        match value {
            Dynamic::Null => Ok(self.runtime.null()),
            Dynamic::Bool(b) => Ok(self.runtime.boolean(*b)),
            Dynamic::Int(n) => self.import_int(*n),
            Dynamic::Float(f) => Ok(self.runtime.number(*f)?),
            Dynamic::String(s) => Ok(self.runtime.string_from_utf8(s)?),
            Dynamic::Array(items) => self.import_array(items, depth + 1),
            Dynamic::Object(map) => self.import_object(map, depth + 1),
        }
    }

    fn import_int(&mut self, n: i64) -> Result<R::Value, ConversionError> {
        if n.unsigned_abs() > MAX_SAFE_INTEGER as u64 {
            return Err(ConversionError::NumberOutOfRange {
                value: n,
                path: ValuePath::root(),
            });
        }
        Ok(self.runtime.number(n as f64)?)
    }

    fn enter(&mut self, depth: usize) -> Result<(), ConversionError> {
        if depth > self.config.max_depth {
            return Err(ConversionError::DepthLimitExceeded {
                limit: self.config.max_depth,
                path: ValuePath::root(),
            });
        }
        self.containers += 1;
        Ok(())
    }

    fn import_array(&mut self, items: &[Dynamic], depth: usize) -> Result<R::Value, ConversionError> {
        self.enter(depth)?;
        trace!(len = items.len(), depth, "importing array");

        let array = self.runtime.create_array(items.len())?;
        for (i, item) in items.iter().enumerate() {
            let element = self
                .import_value(item, depth)
                .map_err(|e| e.within(PathSegment::Index(i)))?;
            self.runtime
                .set_index(&array, i, element)
                .map_err(|e| ConversionError::from(e).within(PathSegment::Index(i)))?;
        }

        Ok(array)
    }

    fn import_object(
        &mut self,
        map: &HashMap<String, Dynamic>,
        depth: usize,
    ) -> Result<R::Value, ConversionError> {
        self.enter(depth)?;
        trace!(len = map.len(), depth, "importing object");

        let object = self.runtime.create_object()?;
        for (key, item) in map {
            let property = self
                .import_value(item, depth)
                .map_err(|e| e.within(PathSegment::Key(key.clone())))?;
            self.runtime
                .set_property(&object, key, property)
                .map_err(|e| ConversionError::from(e).within(PathSegment::Key(key.clone())))?;
        }

        Ok(object)
    }
}
