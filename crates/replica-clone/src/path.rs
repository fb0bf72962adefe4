//! Structural paths from the clone root to a nested value

use std::fmt;

/// One step from a container into one of its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Record property, error property or map entry value (`.key`)
    Key(String),
    /// Array element (`[i]`)
    Index(usize),
    /// Map key at insertion position `i` (`.keys[i]`)
    MapKey(usize),
    /// Set element at insertion position `i` (`.values[i]`)
    SetValue(usize),
}

/// Path from the root of a clone to the value currently being visited.
///
/// Renders as `root`, `root.nested.deeper.func`, `root[2]`,
/// `root.values[2]`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClonePath {
    segments: Vec<PathSegment>,
}

impl ClonePath {
    /// The root path
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into a child
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Return to the parent
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Segments below the root
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether this is the root itself
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Reset to the root
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

impl fmt::Display for ClonePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
                PathSegment::MapKey(i) => write!(f, ".keys[{}]", i)?,
                PathSegment::SetValue(i) => write!(f, ".values[{}]", i)?,
            }
        }
        Ok(())
    }
}
