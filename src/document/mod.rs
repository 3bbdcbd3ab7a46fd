//! Document Tree
//!
//! An immutable arena copy of the parsed markup plus the per-load identifier
//! registry.
//!
//! # Overview
//!
//! - [`Document`]: owns every node and the id registry of one load
//! - [`Node`]: a `Copy` handle into the document; the undefined sentinel is a
//!   handle that points nowhere, and every accessor on it yields "undefined"
//! - [`IdRegistry`]: global id → node map, built once while the tree is copied
//!
//! # Reference Resolution
//!
//! Links come in two flavours:
//!
//! - `#id` links resolve through the registry only.
//! - Bare (scoped) links are matched against `sid` attributes, walking up from
//!   the current node and checking each ancestor plus its direct children. The
//!   nearest scope wins; if nothing matches the registry is consulted.
//!
//! ```rust,ignore
//! let doc = Document::parse_str(xml)?;
//! let geometry = doc.root().find_descendant("instance_geometry").linked("url");
//! assert!(geometry.has_name("geometry"));
//! ```

mod node;
mod registry;

pub use node::{Document, Node, NodeId};
pub use registry::IdRegistry;
