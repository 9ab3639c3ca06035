/// Dotted permission segments accumulated while a command tree is emitted.
///
/// An empty path disables tracking: `push`/`pop` do nothing and every
/// permission comes out empty, which means "defer to the host baseline".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPath {
    segments: Vec<String>,
    enabled: bool,
}

impl PermissionPath {
    pub fn new<I, S>(prefix: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = prefix
            .into_iter()
            .map(Into::into)
            .filter(|segment: &String| !segment.is_empty())
            .collect();
        let enabled = !segments.is_empty();
        Self { segments, enabled }
    }

    /// A tracker that never produces permissions.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Split a dotted prefix such as `mymod.config.edit`.
    pub fn parse(dotted: &str) -> Self {
        Self::new(dotted.split('.'))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn push(&mut self, name: &str) {
        if self.enabled {
            self.segments.push(name.to_string());
        }
    }

    pub fn pop(&mut self) {
        if self.enabled {
            self.segments.pop();
        }
    }

    pub fn current(&self) -> String {
        self.segments.join(".")
    }

    /// Permission the named child of the current position would carry.
    pub fn child(&self, name: &str) -> String {
        if !self.enabled {
            return String::new();
        }
        let mut permission = self.current();
        if !permission.is_empty() {
            permission.push('.');
        }
        permission.push_str(name);
        permission
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}
