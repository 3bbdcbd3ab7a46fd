//! Error Types
//!
//! This module defines the error type returned by every fallible loader API.
//!
//! # Overview
//!
//! Loading follows a two-tier policy:
//!
//! - **Soft misses** (optional elements, unresolved texture channels, a failed
//!   material-symbol guess) never surface here. They are `Option::None` values
//!   plus a log line, and the corresponding feature is simply omitted.
//! - **Hard violations** (an element or attribute the format mandates is
//!   missing, parallel arrays disagree in length, a symbol cannot be resolved)
//!   are reported as a [`DaeError`] and abort the whole document.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, DaeError>`.
//!
//! ```rust,ignore
//! use myth_dae::errors::{DaeError, Result};
//!
//! fn compile(xml: &str) -> Result<()> {
//!     let _scene = myth_dae::ColladaLoader::default().load_str(xml)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The error type for COLLADA loading.
///
/// Every variant describes a violated structural requirement of the document;
/// the loader never returns a partially built scene alongside one of these.
#[derive(Error, Debug)]
pub enum DaeError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The markup could not be tokenized.
    #[error("XML parse error: {0}")]
    Xml(#[from] xmltree::ParseError),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document root is not a `COLLADA` element.
    #[error("Expected a COLLADA root element, found <{0}>")]
    NotCollada(String),

    // ========================================================================
    // Structural Errors
    // ========================================================================
    /// A child element required by the format is absent.
    #[error("<{parent}> requires a <{element}> child")]
    MissingElement {
        /// Tag of the element that should contain the child
        parent: String,
        /// Tag of the missing child
        element: String,
    },

    /// An attribute required by the format is absent or malformed.
    #[error("<{element}> requires a valid '{attribute}' attribute")]
    MissingAttribute {
        /// Tag of the element
        element: String,
        /// Name of the attribute
        attribute: String,
    },

    /// A mandatory link does not resolve to any node.
    #[error("<{element}> links to '{link}' which cannot be resolved")]
    UnresolvedLink {
        /// Tag of the element holding the link
        element: String,
        /// The link text as written in the document
        link: String,
    },

    /// A link resolved to an element of the wrong kind.
    #[error("Expected <{expected}>, found <{found}>")]
    UnexpectedElement {
        /// Tag the format requires
        expected: String,
        /// Tag actually found
        found: String,
    },

    /// An element carries content that could not be decoded.
    #[error("Invalid value in <{element}>: {detail}")]
    InvalidValue {
        /// Tag of the element
        element: String,
        /// What was wrong
        detail: String,
    },

    /// An element has the wrong number of children of some kind.
    #[error("Invalid element count in <{element}>: {detail}")]
    InvalidElementCount {
        /// Tag of the element
        element: String,
        /// What was expected
        detail: String,
    },

    // ========================================================================
    // Geometry Errors
    // ========================================================================
    /// Two parallel arrays disagree in length.
    #[error("Length mismatch in {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Which arrays were compared
        what: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// An index stream points outside its source array.
    #[error("Index out of range in {what}: {index} (len: {len})")]
    IndexOutOfRange {
        /// Which array was indexed
        what: String,
        /// The offending index
        index: i64,
        /// Length of the indexed array
        len: usize,
    },

    /// Two inputs feed the same semantic and set of one primitive.
    #[error("Duplicate input for semantic {semantic} in set {set}")]
    DuplicateInput {
        /// Semantic name
        semantic: String,
        /// Set index
        set: u32,
    },

    // ========================================================================
    // Skinning & Animation Errors
    // ========================================================================
    /// A joint symbol has no matching scene node.
    #[error("Joint '{0}' does not match any scene node")]
    UnresolvedJoint(String),

    /// Bone indices are stored as bytes.
    #[error("Skin declares {0} joints, at most 256 are supported")]
    TooManyJoints(usize),

    /// A channel targets a property that cannot be represented.
    #[error("Unsupported animation channel target: {0}")]
    UnknownChannelTarget(String),
}

/// Alias for `Result<T, DaeError>`.
pub type Result<T> = std::result::Result<T, DaeError>;

impl DaeError {
    pub(crate) fn missing_element(parent: &str, element: &str) -> Self {
        Self::MissingElement {
            parent: parent.to_string(),
            element: element.to_string(),
        }
    }

    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn unresolved(element: &str, link: &str) -> Self {
        Self::UnresolvedLink {
            element: element.to_string(),
            link: link.to_string(),
        }
    }

    pub(crate) fn invalid(element: &str, detail: impl Into<String>) -> Self {
        Self::InvalidValue {
            element: element.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}
