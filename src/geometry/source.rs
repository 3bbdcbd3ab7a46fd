use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::document::{Node, NodeId};
use crate::errors::{DaeError, Result};
use crate::value::{BOOL_LIST, FLOAT_LIST, INT, INT_LIST, NAME_LIST};

/// Typed payload of a `source` element.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    Float(Vec<f32>),
    Int(Vec<i32>),
    Bool(Vec<bool>),
    Name(Vec<String>),
}

impl SourceData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            SourceData::Float(v) => v.len(),
            SourceData::Int(v) => v.len(),
            SourceData::Bool(v) => v.len(),
            SourceData::Name(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One decoded `source` element with its accessor stride.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBuffer {
    pub id: String,
    pub stride: usize,
    pub data: SourceData,
}

impl SourceBuffer {
    /// Decodes a `source` node.
    ///
    /// The first array child wins; `IDREF_array` and `Name_array` both decode to
    /// names.
    pub fn parse(node: &Node<'_>) -> Result<Self> {
        let id = node.element_id().unwrap_or_default().to_string();
        let stride = node
            .child("technique_common")
            .child("accessor")
            .attribute("stride", &INT)
            .map_or(1, |s| s.max(1) as usize);

        for array in node.iter_children() {
            let data = match array.name() {
                "float_array" => array.content(&FLOAT_LIST).map(SourceData::Float),
                "int_array" => array.content(&INT_LIST).map(SourceData::Int),
                "bool_array" => array.content(&BOOL_LIST).map(SourceData::Bool),
                "Name_array" | "IDREF_array" => Some(SourceData::Name(
                    array.content(&NAME_LIST).unwrap_or_default(),
                )),
                _ => continue,
            };
            let data = data.ok_or_else(|| {
                DaeError::invalid(array.name(), format!("unparsable values in source '{id}'"))
            })?;
            return Ok(Self { id, stride, data });
        }

        Err(DaeError::missing_element(
            &format!("source '{id}'"),
            "float_array|int_array|bool_array|Name_array|IDREF_array",
        ))
    }

    /// Number of `stride`-sized elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.data.len() / self.stride
    }

    #[must_use]
    pub fn floats(&self) -> Option<&[f32]> {
        match &self.data {
            SourceData::Float(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn names(&self) -> Option<&[String]> {
        match &self.data {
            SourceData::Name(v) => Some(v),
            _ => None,
        }
    }

    /// Copies `width` floats of element `index`.
    ///
    /// Integer sources are widened so that index-like attributes can share
    /// the float path.
    pub fn read_floats(&self, index: usize, width: usize, out: &mut Vec<f32>) -> Result<()> {
        let start = index * self.stride;
        let len = self.data.len();
        if index >= self.element_count() || start + width > len {
            return Err(DaeError::IndexOutOfRange {
                what: format!("source '{}'", self.id),
                index: index as i64,
                len: self.element_count(),
            });
        }
        match &self.data {
            SourceData::Float(v) => out.extend_from_slice(&v[start..start + width]),
            SourceData::Int(v) => out.extend(v[start..start + width].iter().map(|&i| i as f32)),
            _ => {
                return Err(DaeError::invalid(
                    "source",
                    format!("'{}' does not hold numbers", self.id),
                ));
            }
        }
        Ok(())
    }
}

/// Decoded sources keyed by node, shared between every input that links them.
#[derive(Debug, Default)]
pub struct SourceCache {
    sources: FxHashMap<NodeId, Arc<SourceBuffer>>,
}

impl SourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the decoded buffer for `node`, parsing it on first use.
    pub fn get_or_parse(&mut self, node: &Node<'_>) -> Result<Arc<SourceBuffer>> {
        let Some(id) = node.node_id() else {
            return Err(DaeError::missing_element("input", "source"));
        };
        if let Some(buffer) = self.sources.get(&id) {
            return Ok(Arc::clone(buffer));
        }
        let buffer = Arc::new(SourceBuffer::parse(node)?);
        self.sources.insert(id, Arc::clone(&buffer));
        Ok(buffer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
