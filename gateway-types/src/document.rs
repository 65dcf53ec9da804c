//! Request document model.
//!
//! A request is a tree of named elements. Leaves carry text, branches carry
//! children, and any element may carry attributes. Serialization to the wire
//! format belongs to the transport.

/// One element of a request document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates a leaf element holding `value`.
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name).with_text(value)
    }

    pub fn with_text(mut self, value: impl Into<String>) -> Self {
        self.text = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Appends a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends `child` only if present and not empty.
    pub fn child_opt(mut self, child: Option<Element>) -> Self {
        if let Some(child) = child.filter(|c| !c.is_empty()) {
            self.children.push(child);
        }
        self
    }

    /// Appends a leaf child.
    pub fn text_child(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.child(Element::leaf(name, value))
    }

    /// Appends a leaf child if `value` is present and non-empty.
    ///
    /// `None` and `Some("")` are treated the same: nothing is emitted.
    pub fn text_child_opt<V: AsRef<str>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) if !v.as_ref().is_empty() => self.text_child(name, v.as_ref()),
            _ => self,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// An element with neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().is_none_or(str::is_empty)
    }

    /// First direct child named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Follows a path of child names from this element.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.find(name))
    }

    /// Text of the element at `path`, if any.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.find_path(path).and_then(Element::text)
    }
}
