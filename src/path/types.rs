use crate::error::PreprocessError;
use std::fmt;
use std::str::FromStr;

/// Token that matches every child of a mapping or sequence.
pub const WILDCARD: &str = "*";

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// One segment of a field specifier as written by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Literal(String),
    Wildcard,
}

/// A parsed dotted field specifier such as `items.*.name.*.first`.
///
/// Specs are validated once, when they are parsed, so expansion and
/// lookup never have to deal with malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldSpec {
    pub fn parse(spec: &str) -> Result<Self, PreprocessError> {
        if spec.is_empty() {
            return Err(PreprocessError::InvalidFieldSpec {
                spec: spec.to_string(),
                reason: "spec is empty".to_string(),
            });
        }

        let mut segments = Vec::new();
        for (position, part) in spec.split(SEPARATOR).enumerate() {
            if part.is_empty() {
                return Err(PreprocessError::InvalidFieldSpec {
                    spec: spec.to_string(),
                    reason: format!("segment {} is empty", position),
                });
            }
            if part == WILDCARD {
                segments.push(PathSegment::Wildcard);
            } else {
                segments.push(PathSegment::Literal(part.to_string()));
            }
        }

        Ok(FieldSpec {
            raw: spec.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, PathSegment::Wildcard))
    }

    /// The concrete path this spec names when it contains no wildcard
    pub fn to_concrete(&self) -> Option<ConcretePath> {
        let mut path = ConcretePath::root();
        for segment in &self.segments {
            match segment {
                PathSegment::Literal(key) => path.push(Segment::Key(key.clone())),
                PathSegment::Wildcard => return None,
            }
        }
        Some(path)
    }
}

impl FromStr for FieldSpec {
    type Err = PreprocessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldSpec::parse(s)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One step into a record.
///
/// `Index` only ever addresses a sequence element. `Key` addresses a mapping
/// entry, or a sequence element when the key is an unsigned integer and the
/// node being walked is a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A path with every wildcard resolved, addressing exactly one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConcretePath {
    segments: Vec<Segment>,
}

impl ConcretePath {
    pub fn root() -> Self {
        ConcretePath::default()
    }

    /// Build a path from a dotted string, treating every segment as a key
    pub fn from_dotted(path: &str) -> Self {
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split(SEPARATOR)
                .map(|s| Segment::Key(s.to_string()))
                .collect()
        };
        ConcretePath { segments }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// A new path one level deeper than this one
    pub fn child(&self, segment: Segment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<Vec<Segment>> for ConcretePath {
    fn from(segments: Vec<Segment>) -> Self {
        ConcretePath { segments }
    }
}

impl fmt::Display for ConcretePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
