use std::fmt;

/// Handle to an object inside a [`crate::ConfigStore`]: the nested field names
/// leading from the root object to it.
///
/// Commands capture paths instead of object references, so the store can swap
/// or mutate the graph without invalidating an already-built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    segments: Vec<&'static str>,
}

impl ObjectPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, name: &'static str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name);
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    pub fn last(&self) -> Option<&'static str> {
        self.segments.last().copied()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Dotted name of a field owned by the object at this path.
    pub fn qualify(&self, field: &str) -> String {
        if self.segments.is_empty() {
            field.to_string()
        } else {
            format!("{self}.{field}")
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.segments.join("."))
    }
}
