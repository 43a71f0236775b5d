use std::fmt;

/// Location of a value inside an argument or result tree.
///
/// Printed as dot-separated segments, e.g. `where.AND.0.id`. The root path
/// prints as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl Path {
    pub fn root() -> Path {
        Path::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns a new path extended by an object key.
    pub fn key(&self, key: impl Into<String>) -> Path {
        let mut ret = self.clone();
        ret.segments.push(PathSegment::Key(key.into()));
        ret
    }

    /// Returns a new path extended by a list index.
    pub fn index(&self, index: usize) -> Path {
        let mut ret = self.clone();
        ret.segments.push(PathSegment::Index(index));
        ret
    }

    /// The last key segment, if any.
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            PathSegment::Key(key) => Some(&key[..]),
            PathSegment::Index(_) => None,
        })
    }
}

impl From<&str> for Path {
    /// Parses a dotted path. Purely numeric segments become list indices.
    fn from(src: &str) -> Path {
        if src.is_empty() {
            return Path::root();
        }

        let segments = src
            .split('.')
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(segment.to_string()),
            })
            .collect();

        Path { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            fmt::Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_prints_nested_paths() {
        let path = Path::root().key("where").key("AND").index(0).key("id");
        assert_eq!(path.to_string(), "where.AND.0.id");
        assert_eq!(path, Path::from("where.AND.0.id"));
        assert_eq!(path.last_key(), Some("id"));
    }

    #[test]
    fn root_prints_empty() {
        assert!(Path::root().is_root());
        assert_eq!(Path::root().to_string(), "");
        assert_eq!(Path::from(""), Path::root());
    }
}
