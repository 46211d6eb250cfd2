// src/convert/path.rs
//! Location of a value inside a nested structure, reported by errors.
//!
//! Paths are assembled while an error propagates out of the recursion:
//! each container level prepends its own segment, so the happy path never
//! pays for bookkeeping.

use std::fmt;

/// One step from a container to a child value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Path from the conversion root to a value, rendered as `$.a[2].b`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuePath {
    // innermost segment first; prepending is a push
    reversed: Vec<PathSegment>,
}

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.reversed.is_empty()
    }

    /// Number of segments below the root
    pub fn len(&self) -> usize {
        self.reversed.len()
    }

    /// Segments from the root outwards
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.reversed.iter().rev()
    }

    pub(crate) fn prepend(&mut self, segment: PathSegment) {
        self.reversed.push(segment);
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in self.segments() {
            match segment {
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
                PathSegment::Key(k) if is_identifier(k) => write!(f, ".{}", k)?,
                PathSegment::Key(k) => write!(f, "[{:?}]", k)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path() {
        let path = ValuePath::root();
        assert!(path.is_root());
        assert_eq!(path.to_string(), "$");
    }

    #[test]
    fn test_prepend_builds_outwards() {
        let mut path = ValuePath::root();
        path.prepend(PathSegment::Key("b".to_string()));
        path.prepend(PathSegment::Index(2));
        path.prepend(PathSegment::Key("a".to_string()));

        assert_eq!(path.len(), 3);
        assert_eq!(path.to_string(), "$.a[2].b");
        assert_eq!(path.segments().next(), Some(&PathSegment::Key("a".to_string())));
    }

    #[test]
    fn test_non_identifier_keys_are_quoted() {
        let mut path = ValuePath::root();
        path.prepend(PathSegment::Key("two words".to_string()));
        path.prepend(PathSegment::Key("0".to_string()));

        assert_eq!(path.to_string(), r#"$["0"]["two words"]"#);
    }
}
