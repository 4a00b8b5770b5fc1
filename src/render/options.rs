//! Rendering options configuration.

/// Layout of the generated XML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum XmlFormat {
    /// One element per line, nested elements indented
    #[default]
    Pretty,
    /// No whitespace between elements
    Compact,
}

/// Options for rendering the CbC XML report.
#[derive(Debug, Clone)]
pub struct XmlOptions {
    /// Pretty-printed or compact output
    pub format: XmlFormat,

    /// Spaces per nesting level when pretty-printing (0-8)
    pub indent: usize,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            format: XmlFormat::Pretty,
            indent: 2,
        }
    }
}

impl XmlOptions {
    /// Create new XML options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact output with no indentation.
    pub fn compact() -> Self {
        Self::new().with_format(XmlFormat::Compact)
    }

    /// Set the output format.
    pub fn with_format(mut self, format: XmlFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the indentation width.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.min(8);
        self
    }
}
