use std::collections::BTreeSet;
use std::iter::FusedIterator;
use std::time::{
    Duration,
    Instant,
};

use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use super::{
    shortest_path,
    GraphView,
    PathError,
    RestrictedView,
    WeightedPath,
    WeightedView,
};
use crate::network::{
    Network,
    NodeId,
};

/// Where a [`YenEngine`] is in its sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No path requested yet.
    Uninitialized,
    /// The shortest path has been returned.
    FirstPathReturned,
    /// At least one deviation round has produced a path.
    Iterating,
    /// No further paths will be produced.
    Exhausted,
}

/// Optional bounds on the work one engine may do.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    /// Stop after this many paths.
    pub max_paths: Option<usize>,
    /// Fail the running call once this instant has passed.
    pub deadline: Option<Instant>,
    /// Keep at most this many pending candidates, discarding the most expensive ones.
    ///
    /// Returned costs stay non-decreasing, but paths descending from a discarded candidate are
    /// never found.
    pub max_candidates: Option<usize>,
}

impl SearchLimits {
    /// Limits with only a path count.
    #[must_use]
    pub const fn max_paths(k: usize) -> Self {
        Self { max_paths: Some(k), deadline: None, max_candidates: None }
    }

    /// Sets the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Caps the candidate heap.
    #[must_use]
    pub const fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }
}

/// Yen's k-shortest loopless paths between one source and one destination.
///
/// The engine is pulled: every call to [`YenEngine::next_path`] (or [`Iterator::next`]) returns
/// the next path in non-decreasing cost order. Deviation starts at each path's deflection node and
/// carries the links deleted to produce it forward, so every simple path is generated exactly once.
///
/// Restricted graphs are exclusion sets over the shared base view; nothing is copied per spur node.
#[derive(Debug)]
pub struct YenEngine<V: GraphView> {
    /// Unrestricted graph all paths are priced against.
    view: V,
    /// First node of every path.
    source: V::Node,
    /// Last node of every path.
    dest: V::Node,
    /// Work bounds.
    limits: SearchLimits,
    /// Position in the sequence.
    state: EngineState,
    /// Last path handed out; deviation starts from it.
    current: Option<WeightedPath<V::Node>>,
    /// Pending candidates, cheapest first.
    candidates: BTreeSet<WeightedPath<V::Node>>,
    /// Paths handed out so far.
    returned: usize,
}

impl<'a, N: NodeId> YenEngine<WeightedView<'a, N>> {
    /// Engine over `network`, weighting links by `weight_key` and, if given, reporting bottleneck
    /// capacities from `capacity_key`.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidEndpoints`] when `source == dest` or either is missing, and
    /// [`PathError::MissingAttribute`] when a link has no `weight_key`.
    pub fn new(
        network: &'a Network<N>,
        source: N,
        dest: N,
        weight_key: &str,
        capacity_key: Option<&str>,
    ) -> Result<Self, PathError> {
        if source == dest || !network.contains_node(&source) || !network.contains_node(&dest) {
            return Err(PathError::invalid_endpoints(&source, &dest));
        }
        let mut view = WeightedView::new(network, weight_key)?;
        if let Some(key) = capacity_key {
            view = view.with_capacity(key);
        }
        Self::over(view, source, dest)
    }
}

impl<V: GraphView> YenEngine<V> {
    /// Engine over an arbitrary view.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidEndpoints`] when `source == dest` or either is not in `view`.
    pub fn over(view: V, source: V::Node, dest: V::Node) -> Result<Self, PathError> {
        if source == dest || !view.contains_node(&source) || !view.contains_node(&dest) {
            return Err(PathError::invalid_endpoints(&source, &dest));
        }
        Ok(Self {
            view,
            source,
            dest,
            limits: SearchLimits::default(),
            state: EngineState::Uninitialized,
            current: None,
            candidates: BTreeSet::new(),
            returned: 0,
        })
    }

    /// Applies work bounds.
    #[must_use]
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Where the engine is in its sequence.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Number of paths returned so far.
    #[must_use]
    pub const fn returned(&self) -> usize {
        self.returned
    }

    /// Number of candidates waiting in the heap.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.candidates.len()
    }

    /// The unrestricted view the engine searches.
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Produces the next shortest loopless path.
    ///
    /// Returns `Ok(None)` once every simple path has been produced or `max_paths` is reached.
    /// After any error the engine is exhausted.
    ///
    /// # Errors
    ///
    /// - [`PathError::NoPathFound`] on the first call when the endpoints are disconnected.
    /// - [`PathError::DeadlineExceeded`] when the deadline passes.
    /// - [`PathError::InconsistentGraph`] / [`PathError::MissingEdge`] for malformed graphs.
    #[instrument(level = "debug", skip(self), fields(source = ?self.source, dest = ?self.dest, returned = self.returned))]
    pub fn next_path(&mut self) -> Result<Option<WeightedPath<V::Node>>, PathError> {
        if self.state == EngineState::Exhausted {
            return Ok(None);
        }
        if self.limits.max_paths.is_some_and(|max| self.returned >= max) {
            debug!("path limit reached");
            self.state = EngineState::Exhausted;
            return Ok(None);
        }

        let result = match self.state {
            EngineState::Uninitialized => self.first_path(),
            _ => self.deviate(),
        };

        match result {
            Ok(Some(path)) => {
                self.returned += 1;
                self.current = Some(path.clone());
                Ok(Some(path))
            },
            Ok(None) => {
                info!(paths = self.returned, "no further loopless paths");
                self.state = EngineState::Exhausted;
                Ok(None)
            },
            Err(err) => {
                self.state = EngineState::Exhausted;
                self.candidates.clear();
                Err(err)
            },
        }
    }

    /// Plain shortest path on the unrestricted view.
    fn first_path(&mut self) -> Result<Option<WeightedPath<V::Node>>, PathError> {
        self.check_deadline()?;
        let path = shortest_path(&self.view, &self.source, &self.dest)?;
        let first = WeightedPath::new(path.nodes, &self.view, self.source.clone(), BTreeSet::new())?;
        self.state = EngineState::FirstPathReturned;
        Ok(Some(first))
    }

    /// One deviation round from the current path, then pops the cheapest candidate.
    fn deviate(&mut self) -> Result<Option<WeightedPath<V::Node>>, PathError> {
        let Some(current) = self.current.take() else {
            return Ok(None);
        };

        let nodes = current.nodes();
        let start = nodes.iter().position(|n| n == current.deflection_node()).unwrap_or(0);
        for spur_index in start..nodes.len().saturating_sub(1) {
            self.check_deadline()?;
            if let Some(candidate) = self.spur_candidate(&current, spur_index)? {
                self.push_candidate(candidate);
            }
        }
        debug!(pending = self.candidates.len(), "deviation round complete");

        let next = self.candidates.pop_first();
        if next.is_some() {
            self.state = EngineState::Iterating;
        }
        Ok(next)
    }

    /// Candidate branching off `current` at `nodes[spur_index]`, if the destination is still
    /// reachable once the root path and the already explored links are hidden.
    fn spur_candidate(
        &self,
        current: &WeightedPath<V::Node>,
        spur_index: usize,
    ) -> Result<Option<WeightedPath<V::Node>>, PathError> {
        let nodes = current.nodes();
        let spur = &nodes[spur_index];
        let next = &nodes[spur_index + 1];

        let mut restricted = RestrictedView::new(&self.view);
        for root in &nodes[..spur_index] {
            restricted.exclude_node(root.clone());
        }
        for (from, to) in current.deleted_links() {
            let touches_spur = from == spur || (!self.view.is_directed() && to == spur);
            if touches_spur {
                restricted.exclude_link(from.clone(), to.clone());
            }
        }
        restricted.exclude_link(spur.clone(), next.clone());

        let suffix = match shortest_path(&restricted, spur, &self.dest) {
            Ok(path) => path,
            Err(PathError::NoPathFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut deleted = current.deleted_links().clone();
        deleted.insert((spur.clone(), next.clone()));

        let mut full = nodes[..spur_index].to_vec();
        full.extend(suffix.nodes);
        WeightedPath::new(full, &self.view, spur.clone(), deleted).map(Some)
    }

    /// Adds a candidate, trimming the heap to `max_candidates`.
    fn push_candidate(&mut self, candidate: WeightedPath<V::Node>) {
        self.candidates.insert(candidate);
        let Some(max) = self.limits.max_candidates else {
            return;
        };
        while self.candidates.len() > max {
            if let Some(dropped) = self.candidates.pop_last() {
                warn!(cost = dropped.cost(), "candidate heap full, discarding the most expensive candidate");
            }
        }
    }

    /// Fails once the deadline has passed.
    fn check_deadline(&self) -> Result<(), PathError> {
        match self.limits.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(PathError::DeadlineExceeded { returned: self.returned })
            },
            _ => Ok(()),
        }
    }
}

impl<V: GraphView> Iterator for YenEngine<V> {
    type Item = Result<WeightedPath<V::Node>, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_path().transpose()
    }
}

impl<V: GraphView> FusedIterator for YenEngine<V> {}
