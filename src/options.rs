#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Nodes built before a failing tag stay attached.
    #[default]
    Incremental,
    /// A failing call leaves the tree exactly as it was.
    Atomic,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub mode: BuildMode,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atomic() -> Self {
        Self::new().with_mode(BuildMode::Atomic)
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Maximum number of nodes the arena may hold.
    pub node_limit: Option<usize>,
}

impl TreeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_limit(mut self, node_limit: Option<usize>) -> Self {
        self.node_limit = node_limit;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct BufferOptions {
    /// Capacity ceiling in bytes. Growth beyond it fails like an exhausted allocator.
    pub limit: Option<usize>,
}

impl BufferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count)
    }

    pub fn unit(self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(count) => " ".repeat(count),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub indent: Indent,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }
}
