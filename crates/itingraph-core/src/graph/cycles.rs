/// Simple-cycle enumeration over a [`FlightGraph`].
///
/// For every airport, in discovery order, a depth-first walk starts from that
/// airport and records the current flight path whenever it steps back onto
/// the start. Stepping onto any other airport already on the path ends the
/// branch. The path and its airport set are a push/pop stack, so each branch
/// sees exactly the airports above it.
///
/// # Rotations
///
/// The raw walk reports a cycle through `k` airports `k` times, once from
/// each airport on it. [`enumerate_rotations`] returns that raw output.
/// [`enumerate_cycles`] collapses the rotations of the same flight cycle into
/// one entry and keeps the rotation discovered first, i.e. the one walked from
/// the earliest-discovered airport on the cycle. Later rotations are dropped
/// without being reported.
///
/// For a round trip `A→B` then `B→A`, with `A` discovered first, the kept
/// cycle starts with the `A→B` leg, and its validity is judged in that order.
///
/// # Budget
///
/// Enumeration is exponential in the worst case. An [`EnumerationBudget`]
/// caps both the number of cycles kept and the number of flights traversed;
/// when either cap is hit the walk stops with
/// [`CycleSearchError::BudgetExceeded`].
use std::collections::HashSet;
use std::fmt;

use petgraph::stable_graph::NodeIndex;
use tracing::debug;

use crate::flight::{Cycle, FlightRecord};
use crate::graph::{FlightGraph, OutgoingLeg, build_graph};

// ---------------------------------------------------------------------------
// Budget and errors
// ---------------------------------------------------------------------------

/// Upper bounds on a single enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationBudget {
    /// Maximum number of cycles kept.
    pub max_cycles: usize,
    /// Maximum number of flight traversals across all walks.
    pub max_steps: usize,
}

impl EnumerationBudget {
    /// Default cap on kept cycles.
    pub const DEFAULT_MAX_CYCLES: usize = 10_000;
    /// Default cap on flight traversals.
    pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

    /// A budget that never runs out in practice.
    pub fn unlimited() -> Self {
        Self {
            max_cycles: usize::MAX,
            max_steps: usize::MAX,
        }
    }
}

impl Default for EnumerationBudget {
    fn default() -> Self {
        Self {
            max_cycles: Self::DEFAULT_MAX_CYCLES,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }
}

/// Which budget cap was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLimit {
    /// More than this many cycles were found.
    Cycles(usize),
    /// More than this many flights were traversed.
    Steps(usize),
}

impl fmt::Display for BudgetLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycles(n) => write!(f, "more than {n} cycles"),
            Self::Steps(n) => write!(f, "more than {n} traversal steps"),
        }
    }
}

/// Errors from cycle enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleSearchError {
    /// The enumeration budget ran out before the walk finished.
    BudgetExceeded {
        /// The cap that was hit.
        limit: BudgetLimit,
        /// Cycles kept before stopping.
        cycles_found: usize,
    },
}

impl fmt::Display for CycleSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExceeded {
                limit,
                cycles_found,
            } => write!(
                f,
                "cycle enumeration stopped after {cycles_found} cycles: {limit}"
            ),
        }
    }
}

impl std::error::Error for CycleSearchError {}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Returns every cycle the walk records, once per rotation, in discovery order.
///
/// # Errors
///
/// [`CycleSearchError::BudgetExceeded`] when `budget` runs out.
pub fn enumerate_rotations(
    graph: &FlightGraph<'_>,
    budget: &EnumerationBudget,
) -> Result<Vec<Cycle>, CycleSearchError> {
    CycleSearch::new(graph, *budget, false).run()
}

/// Returns every distinct flight cycle once, in first-discovery order, each
/// in the rotation it was first discovered in.
///
/// # Errors
///
/// [`CycleSearchError::BudgetExceeded`] when `budget` runs out.
pub fn enumerate_cycles(
    graph: &FlightGraph<'_>,
    budget: &EnumerationBudget,
) -> Result<Vec<Cycle>, CycleSearchError> {
    CycleSearch::new(graph, *budget, true).run()
}

/// Builds the graph for `flights` and runs [`enumerate_cycles`].
///
/// # Errors
///
/// [`CycleSearchError::BudgetExceeded`] when `budget` runs out.
pub fn find_cycles(
    flights: &[FlightRecord],
    budget: &EnumerationBudget,
) -> Result<Vec<Cycle>, CycleSearchError> {
    enumerate_cycles(&build_graph(flights), budget)
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// One airport on the DFS stack with its outgoing flights.
struct Frame<'a> {
    node: NodeIndex,
    legs: Vec<OutgoingLeg<'a>>,
    next: usize,
}

struct CycleSearch<'g, 'a> {
    graph: &'g FlightGraph<'a>,
    budget: EnumerationBudget,
    collapse_rotations: bool,
    steps: usize,
    found: Vec<Cycle>,
    seen: HashSet<Vec<usize>>,
}

impl<'g, 'a> CycleSearch<'g, 'a> {
    fn new(graph: &'g FlightGraph<'a>, budget: EnumerationBudget, collapse_rotations: bool) -> Self {
        Self {
            graph,
            budget,
            collapse_rotations,
            steps: 0,
            found: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Cycle>, CycleSearchError> {
        let starts: Vec<NodeIndex> = self.graph.node_indices().collect();
        for start in starts {
            self.walk_from(start)?;
        }
        debug!(
            airports = self.graph.node_count(),
            flights = self.graph.edge_count(),
            cycles = self.found.len(),
            steps = self.steps,
            collapsed = self.collapse_rotations,
            "cycle enumeration complete"
        );
        Ok(self.found)
    }

    fn frame(&self, node: NodeIndex) -> Frame<'a> {
        Frame {
            node,
            legs: self.graph.outgoing(node).collect(),
            next: 0,
        }
    }

    fn walk_from(&mut self, start: NodeIndex) -> Result<(), CycleSearchError> {
        // `path[i]` is the record index of the flight into `stack[i + 1]`.
        let mut path: Vec<usize> = Vec::new();
        let mut on_path: HashSet<NodeIndex> = HashSet::new();
        let mut stack: Vec<Frame<'a>> = vec![self.frame(start)];
        on_path.insert(start);

        while let Some(top) = stack.last_mut() {
            let Some(leg) = top.legs.get(top.next).copied() else {
                // All flights out of this airport explored: backtrack.
                on_path.remove(&top.node);
                stack.pop();
                if !stack.is_empty() {
                    path.pop();
                }
                continue;
            };
            top.next += 1;

            self.steps += 1;
            if self.steps > self.budget.max_steps {
                return Err(self.exceeded(BudgetLimit::Steps(self.budget.max_steps)));
            }

            if on_path.contains(&leg.target) {
                if leg.target == start {
                    path.push(leg.record);
                    let recorded = self.record(&path);
                    path.pop();
                    recorded?;
                }
                continue;
            }

            path.push(leg.record);
            on_path.insert(leg.target);
            stack.push(self.frame(leg.target));
        }
        Ok(())
    }

    fn record(&mut self, path: &[usize]) -> Result<(), CycleSearchError> {
        let flights = self.graph.flights();
        if self.collapse_rotations && !self.seen.insert(rotation_key(path)) {
            return Ok(());
        }
        if self.found.len() >= self.budget.max_cycles {
            return Err(self.exceeded(BudgetLimit::Cycles(self.budget.max_cycles)));
        }
        let legs: Vec<FlightRecord> = path
            .iter()
            .filter_map(|&i| flights.get(i))
            .cloned()
            .collect();
        self.found.push(Cycle::from_path(legs));
        Ok(())
    }

    fn exceeded(&self, limit: BudgetLimit) -> CycleSearchError {
        CycleSearchError::BudgetExceeded {
            limit,
            cycles_found: self.found.len(),
        }
    }
}

/// Identifies a cycle independently of where the walk entered it: the
/// rotation of `path` that starts at its lowest record index.
fn rotation_key(path: &[usize]) -> Vec<usize> {
    let start = path
        .iter()
        .enumerate()
        .min_by_key(|&(_, &record)| record)
        .map_or(0, |(pos, _)| pos);
    path[start..].iter().chain(&path[..start]).copied().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
