//! Reporting hook for features the compiler skips.
//!
//! Everything here goes through the `log` facade under the `myth_dae` target;
//! the messages are for humans and carry no stable structure.

use crate::document::Node;

const TARGET: &str = "myth_dae";

/// An element or feature that is recognized but not compiled.
pub fn unsupported(tag: &str, detail: impl std::fmt::Display) {
    log::info!(target: TARGET, "[{tag}] not supported: {detail}");
}

/// An element that is skipped entirely.
pub fn skipped(node: &Node<'_>) {
    log::info!(target: TARGET, "[{}] skipped {node}", node.name());
}

/// A reference that could not be followed; the dependent feature is dropped.
pub fn unresolved(tag: &str, detail: impl std::fmt::Display) {
    log::warn!(target: TARGET, "[{tag}] unresolved: {detail}");
}
