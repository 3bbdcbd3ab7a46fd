use std::collections::VecDeque;
use std::fmt;
use std::io::Read;

use rustc_hash::FxHashMap;
use xmltree::{Element, XMLNode};

use super::registry::IdRegistry;
use crate::errors::Result;
use crate::value::ValueTransform;

/// Index of a node inside its [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    attributes: FxHashMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena copy of one markup document plus its id registry.
///
/// Parents are stored as plain indices, so the tree has no ownership cycles;
/// dropping the document releases every node and the registry at once.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    registry: IdRegistry,
}

impl Document {
    /// Tokenizes `xml` and copies it into a new arena.
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::from_reader(xml.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let element = Element::parse(reader)?;
        Ok(Self::from_element(&element))
    }

    /// Copies an already parsed DOM. Ids are registered in document order.
    #[must_use]
    pub fn from_element(root: &Element) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            registry: IdRegistry::new(),
        };

        // Explicit stack keeps deep hierarchies off the call stack.
        let mut stack: Vec<(&Element, Option<NodeId>)> = vec![(root, None)];
        while let Some((element, parent)) = stack.pop() {
            let id = doc.push(element, parent);
            let child_elements: Vec<&Element> = element
                .children
                .iter()
                .filter_map(|n| match n {
                    XMLNode::Element(e) => Some(e),
                    _ => None,
                })
                .collect();
            for child in child_elements.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        doc.register_ids();
        doc
    }

    fn push(&mut self, element: &Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());

        let mut text = String::new();
        for child in &element.children {
            match child {
                XMLNode::Text(t) | XMLNode::CData(t) => {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(t);
                }
                _ => {}
            }
        }

        self.nodes.push(NodeData {
            name: element.name.clone(),
            attributes: element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            text,
            parent,
            children: Vec::new(),
        });

        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    fn register_ids(&mut self) {
        for index in 0..self.nodes.len() {
            let Some(value) = self.nodes[index].attributes.get("id") else {
                continue;
            };
            let value = value.clone();
            if !self.registry.register(&value, NodeId::from_index(index)) {
                log::warn!("Duplicate id '{value}', keeping the first declaration");
            }
        }
    }

    /// The top-level element.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            doc: self,
            id: (!self.nodes.is_empty()).then_some(NodeId(0)),
        }
    }

    /// Handle for `id`; undefined if the id does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node {
            doc: self,
            id: (id.index() < self.nodes.len()).then_some(id),
        }
    }

    /// The undefined sentinel for this document.
    #[must_use]
    pub fn undefined(&self) -> Node<'_> {
        Node { doc: self, id: None }
    }

    /// Global lookup by `id` attribute (without the leading `#`).
    #[must_use]
    pub fn lookup(&self, id: &str) -> Node<'_> {
        Node {
            doc: self,
            id: self.registry.get(id),
        }
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &IdRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Read-only handle to a document node.
///
/// A handle is either defined (points at a node) or the undefined sentinel.
/// All navigation on the sentinel returns the sentinel again and all value
/// reads return `None`, so lookups can be chained without branching.
#[derive(Clone, Copy)]
pub struct Node<'doc> {
    doc: &'doc Document,
    id: Option<NodeId>,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            None => f.write_str("<undefined>"),
            Some(data) => {
                write!(f, "<{}", data.name)?;
                if let Some(id) = data.attributes.get("id") {
                    write!(f, " id=\"{id}\"")?;
                }
                if let Some(sid) = data.attributes.get("sid") {
                    write!(f, " sid=\"{sid}\"")?;
                }
                f.write_str(">")
            }
        }
    }
}

impl<'doc> Node<'doc> {
    fn data(&self) -> Option<&'doc NodeData> {
        self.id.map(|id| self.doc.data(id))
    }

    fn wrap(&self, id: Option<NodeId>) -> Node<'doc> {
        Node { doc: self.doc, id }
    }

    #[inline]
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.id.is_some()
    }

    #[inline]
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &'doc Document {
        self.doc
    }

    /// Tag name; empty for the undefined node.
    #[must_use]
    pub fn name(&self) -> &'doc str {
        self.data().map_or("", |d| d.name.as_str())
    }

    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.data().is_some_and(|d| d.name == name)
    }

    /// Raw attribute text.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'doc str> {
        self.data()
            .and_then(|d| d.attributes.get(name))
            .map(String::as_str)
    }

    /// Attribute decoded through `decoder`.
    pub fn attribute<T>(&self, name: &str, decoder: &impl ValueTransform<str, T>) -> Option<T> {
        self.attr(name).and_then(|raw| decoder.transform(raw))
    }

    /// Trimmed text content; `None` for the undefined node.
    #[must_use]
    pub fn text(&self) -> Option<&'doc str> {
        self.data().map(|d| d.text.trim())
    }

    /// Text content decoded through `decoder`.
    pub fn content<T>(&self, decoder: &impl ValueTransform<str, T>) -> Option<T> {
        self.text().and_then(|raw| decoder.transform(raw))
    }

    /// The `id` attribute.
    #[must_use]
    pub fn element_id(&self) -> Option<&'doc str> {
        self.attr("id")
    }

    /// The scoped `sid` attribute.
    #[must_use]
    pub fn sid(&self) -> Option<&'doc str> {
        self.attr("sid")
    }

    #[must_use]
    pub fn parent(&self) -> Node<'doc> {
        self.wrap(self.data().and_then(|d| d.parent))
    }

    /// Iterates over all direct children in document order.
    pub fn iter_children(&self) -> impl Iterator<Item = Node<'doc>> + use<'doc> {
        let doc = self.doc;
        self.data()
            .map(|d| d.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&id| Node { doc, id: Some(id) })
    }

    /// Children whose tag is one of `names`, in document order. An empty
    /// name list selects every child.
    #[must_use]
    pub fn children(&self, names: &[&str]) -> Vec<Node<'doc>> {
        self.iter_children()
            .filter(|c| names.is_empty() || names.contains(&c.name()))
            .collect()
    }

    /// First child named `name`, or undefined.
    #[must_use]
    pub fn child(&self, name: &str) -> Node<'doc> {
        self.iter_children()
            .find(|c| c.has_name(name))
            .unwrap_or(self.wrap(None))
    }

    /// First child named `name` whose attribute `attr` equals `value`.
    #[must_use]
    pub fn child_with(&self, name: &str, attr: &str, value: &str) -> Node<'doc> {
        self.iter_children()
            .find(|c| c.has_name(name) && c.attr(attr) == Some(value))
            .unwrap_or(self.wrap(None))
    }

    /// Walks to the top of the tree.
    #[must_use]
    pub fn root(&self) -> Node<'doc> {
        let mut current = *self;
        loop {
            let parent = current.parent();
            if !parent.is_defined() {
                return current;
            }
            current = parent;
        }
    }

    /// Breadth-first search below this node.
    #[must_use]
    pub fn find_descendant(&self, name: &str) -> Node<'doc> {
        self.find_descendant_by(|n| n.has_name(name))
    }

    /// This node or its first descendant (breadth-first) with the given `sid`.
    #[must_use]
    pub fn find_sid(&self, sid: &str) -> Node<'doc> {
        if self.sid() == Some(sid) {
            return *self;
        }
        self.find_descendant_by(|n| n.sid() == Some(sid))
    }

    fn find_descendant_by(&self, pred: impl Fn(&Node<'doc>) -> bool) -> Node<'doc> {
        let mut queue: VecDeque<Node<'doc>> = self.iter_children().collect();
        while let Some(node) = queue.pop_front() {
            if pred(&node) {
                return node;
            }
            queue.extend(node.iter_children());
        }
        self.wrap(None)
    }

    /// Reads attribute `attr` as a link and resolves it.
    #[must_use]
    pub fn linked(&self, attr: &str) -> Node<'doc> {
        match self.attr(attr) {
            Some(link) => self.resolve(link),
            None => self.wrap(None),
        }
    }

    /// Shorthand for `linked("source")`.
    #[must_use]
    pub fn linked_source(&self) -> Node<'doc> {
        self.linked("source")
    }

    /// Shorthand for `linked("url")`.
    #[must_use]
    pub fn linked_url(&self) -> Node<'doc> {
        self.linked("url")
    }

    /// Resolves a link relative to this node.
    ///
    /// `#id` goes straight to the registry. A bare symbol is searched by `sid`
    /// from the parent upward (each scope checks itself, then its direct
    /// children), falling back to the registry. The node's own children are
    /// not searched. Further `/`-separated segments
    /// are matched by `sid` among the descendants of the previous match.
    #[must_use]
    pub fn resolve(&self, link: &str) -> Node<'doc> {
        if !self.is_defined() {
            return *self;
        }
        let link = link.trim();
        if let Some(global) = link.strip_prefix('#') {
            return self.doc.lookup(global);
        }

        let mut segments = link.split('/').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            return self.wrap(None);
        };

        let mut current = self.resolve_scoped(first);
        for segment in segments {
            if !current.is_defined() {
                break;
            }
            current = current.find_descendant_by(|n| n.sid() == Some(segment));
        }
        current
    }

    fn resolve_scoped(&self, symbol: &str) -> Node<'doc> {
        let mut scope = self.parent();
        while scope.is_defined() {
            if scope.sid() == Some(symbol) {
                return scope;
            }
            if let Some(hit) = scope.iter_children().find(|c| c.sid() == Some(symbol)) {
                return hit;
            }
            scope = scope.parent();
        }
        self.doc.lookup(symbol)
    }

    /// Decodes the content of the first child named `name`.
    pub fn child_value<T>(&self, name: &str, decoder: &impl ValueTransform<str, T>) -> Option<T> {
        self.child(name).content(decoder)
    }

    /// Whether `ancestor` is a proper ancestor of this node.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Node<'doc>) -> bool {
        let mut current = self.parent();
        while current.is_defined() {
            if current == *ancestor {
                return true;
            }
            current = current.parent();
        }
        false
    }
}
