// src/convert/export.rs
//! Runtime value -> dynamic value

use crate::convert::path::{PathSegment, ValuePath};
use crate::dynamic::Dynamic;
use crate::runtime::{Runtime, ValueKind};
use crate::{BridgeConfig, ConversionError, ExportError, UnsupportedTypeError};
use ahash::{HashMap, HashSet};
use tracing::{debug, trace, warn};

// Engine-reported lengths are not trusted for up-front allocation.
const MAX_PREALLOCATED: usize = 4096;

/// One export call. The runtime is only read, never mutated.
pub struct Exporter<'r, R: Runtime> {
    runtime: &'r R,
    config: &'r BridgeConfig,
    // identities of the containers currently being exported
    active: HashSet<u64>,
    containers: usize,
}

impl<'r, R: Runtime> Exporter<'r, R> {
    pub fn new(runtime: &'r R, config: &'r BridgeConfig) -> Self {
        Self {
            runtime,
            config,
            active: HashSet::default(),
            containers: 0,
        }
    }

    pub fn run(mut self, value: &R::Value) -> Result<Dynamic, ExportError> {
        debug!("exporting runtime value");

        match self.export_value(value, 0) {
            Ok(exported) => {
                debug!(
                    kind = exported.type_name(),
                    containers = self.containers,
                    "export complete"
                );
                Ok(exported)
            }
            Err(e) => {
                warn!(error = %e, "export aborted");
                Err(e)
            }
        }
    }

    /// `depth` is the number of containers enclosing `value`
    fn export_value(&mut self, value: &R::Value, depth: usize) -> Result<Dynamic, ExportError> {
        let kind = self.runtime.kind_of(value)?;

        match kind {
            ValueKind::Undefined | ValueKind::Null => Ok(Dynamic::Null),
            ValueKind::Bool => Ok(Dynamic::Bool(self.runtime.as_boolean(value)?)),
            ValueKind::Number => Ok(Dynamic::Float(self.runtime.as_number(value)?)),
            ValueKind::String => Ok(Dynamic::String(self.runtime.string_to_utf8(value)?)),
            ValueKind::Array => self.export_array(value, depth + 1),
            ValueKind::Object => self.export_object(value, depth + 1),
            ValueKind::Symbol | ValueKind::BigInt | ValueKind::Function | ValueKind::HostObject => {
                Err(UnsupportedTypeError {
                    kind,
                    path: ValuePath::root(),
                }
                .into())
            }
        }
    }

    /// Returns the identity to release on the way out
    fn enter(&mut self, value: &R::Value, depth: usize) -> Result<Option<u64>, ExportError> {
        let identity = if self.config.detect_cycles {
            self.runtime.identity(value)
        } else {
            None
        };

        if let Some(id) = identity {
            if !self.active.insert(id) {
                return Err(ConversionError::CycleDetected {
                    path: ValuePath::root(),
                }
                .into());
            }
        }

        if depth > self.config.max_depth {
            return Err(ConversionError::DepthLimitExceeded {
                limit: self.config.max_depth,
                path: ValuePath::root(),
            }
            .into());
        }

        self.containers += 1;
        Ok(identity)
    }

    fn leave(&mut self, identity: Option<u64>) {
        if let Some(id) = identity {
            self.active.remove(&id);
        }
    }

    fn export_array(&mut self, array: &R::Value, depth: usize) -> Result<Dynamic, ExportError> {
        let identity = self.enter(array, depth)?;

        // read once; later mutation of the array is not observed
        let len = self.runtime.array_length(array)?;
        trace!(len, depth, "exporting array");

        let mut items = Vec::with_capacity(len.min(MAX_PREALLOCATED));
        for i in 0..len {
            let element = self
                .runtime
                .get_index(array, i)
                .map_err(|e| ExportError::from(e).within(PathSegment::Index(i)))?;
            let item = self
                .export_value(&element, depth)
                .map_err(|e| e.within(PathSegment::Index(i)))?;
            items.push(item);
        }

        self.leave(identity);
        Ok(Dynamic::Array(items))
    }

    fn export_object(&mut self, object: &R::Value, depth: usize) -> Result<Dynamic, ExportError> {
        let identity = self.enter(object, depth)?;

        let keys = self.runtime.own_enumerable_keys(object)?;
        trace!(len = keys.len(), depth, "exporting object");

        let mut map = HashMap::with_capacity_and_hasher(keys.len(), Default::default());
        for key in keys {
            let property = match self.runtime.get_property(object, &key) {
                Ok(property) => property,
                Err(e) => return Err(ExportError::from(e).within(PathSegment::Key(key))),
            };

            if self.config.skip_undefined_properties
                && matches!(self.runtime.kind_of(&property), Ok(ValueKind::Undefined))
            {
                continue;
            }

            match self.export_value(&property, depth) {
                Ok(item) => {
                    map.insert(key, item);
                }
                Err(e) => return Err(e.within(PathSegment::Key(key))),
            }
        }

        self.leave(identity);
        Ok(Dynamic::Object(map))
    }
}
