use thiserror::Error;

/// Failures raised by the path search.
///
/// Node identifiers are carried in their `Debug` rendering so the error type stays independent of
/// the node type. Running out of paths is not an error; the engine reports it as `Ok(None)`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Source and destination are equal, or one of them is not in the graph.
    #[error("invalid endpoints {from} -> {to}: both must be distinct nodes of the graph")]
    InvalidEndpoints {
        /// Requested source.
        from: String,
        /// Requested destination.
        to: String,
    },

    /// The destination is not reachable from the source.
    #[error("no path from {from} to {to}")]
    NoPathFound {
        /// Search source.
        from: String,
        /// Search destination.
        to: String,
    },

    /// Predecessors do not lead back to the source, or labels kept decreasing; the graph has a
    /// negative cycle or corrupted link data.
    #[error("inconsistent graph while searching {from} -> {to}: {reason}")]
    InconsistentGraph {
        /// Search source.
        from: String,
        /// Search destination.
        to: String,
        /// What the search observed.
        reason: String,
    },

    /// A path names two consecutive nodes that are not linked.
    #[error("path uses a link {from} -> {to} that is not in the graph")]
    MissingEdge {
        /// First endpoint.
        from: String,
        /// Second endpoint.
        to: String,
    },

    /// A link lacks the attribute a computation was asked to read.
    #[error("link {from} -> {to} has no '{key}' attribute")]
    MissingAttribute {
        /// First endpoint.
        from: String,
        /// Second endpoint.
        to: String,
        /// Attribute name.
        key: String,
    },

    /// The configured wall-clock deadline passed before the next path was found.
    #[error("search deadline exceeded after {returned} paths")]
    DeadlineExceeded {
        /// Paths handed out before the deadline hit.
        returned: usize,
    },
}

impl PathError {
    /// Endpoints that are equal or missing from the graph.
    pub(crate) fn invalid_endpoints(from: &impl std::fmt::Debug, to: &impl std::fmt::Debug) -> Self {
        Self::InvalidEndpoints { from: format!("{from:?}"), to: format!("{to:?}") }
    }

    /// Destination unreachable from the source.
    pub(crate) fn no_path(from: &impl std::fmt::Debug, to: &impl std::fmt::Debug) -> Self {
        Self::NoPathFound { from: format!("{from:?}"), to: format!("{to:?}") }
    }

    /// Broken graph detected during a search.
    pub(crate) fn inconsistent(from: &impl std::fmt::Debug, to: &impl std::fmt::Debug, reason: &str) -> Self {
        Self::InconsistentGraph { from: format!("{from:?}"), to: format!("{to:?}"), reason: reason.to_owned() }
    }

    /// Consecutive path nodes without a link.
    pub(crate) fn missing_edge(from: &impl std::fmt::Debug, to: &impl std::fmt::Debug) -> Self {
        Self::MissingEdge { from: format!("{from:?}"), to: format!("{to:?}") }
    }

    /// Link without the requested attribute.
    pub(crate) fn missing_attribute(from: &impl std::fmt::Debug, to: &impl std::fmt::Debug, key: &str) -> Self {
        Self::MissingAttribute { from: format!("{from:?}"), to: format!("{to:?}"), key: key.to_owned() }
    }
}
