/// Airport graph over a slice of [`FlightRecord`]s, built with `petgraph`.
///
/// Nodes are distinct airport codes; edges are flights, weighted by their
/// position in the record slice. The graph borrows the slice and is rebuilt
/// on every validation call.
///
/// # Ordering
///
/// Traversal order is part of the observable result (cycles are reported in
/// discovery order), so [`FlightGraph`] keeps two orders explicit:
///
/// - nodes in discovery order while scanning records, source before target;
/// - outgoing flights of each node in record order.
///
/// `petgraph` yields a node's edges most-recent-first, so the outgoing order
/// is tracked alongside the graph rather than read back from it.
///
/// # Cycle Enumeration
///
/// See the [`cycles`] submodule.
pub mod cycles;

pub use cycles::{
    BudgetLimit, CycleSearchError, EnumerationBudget, enumerate_cycles, enumerate_rotations,
    find_cycles,
};

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::flight::FlightRecord;
use crate::newtypes::AirportCode;

// ---------------------------------------------------------------------------
// FlightGraph
// ---------------------------------------------------------------------------

/// One outgoing flight of a node.
#[derive(Debug, Clone, Copy)]
pub struct OutgoingLeg<'a> {
    /// Position of the flight in the record slice.
    pub record: usize,
    /// The flight itself.
    pub flight: &'a FlightRecord,
    /// Node the flight arrives at.
    pub target: NodeIndex,
}

/// A directed multigraph of airports and flights.
///
/// Construct with [`build_graph`].
#[derive(Debug)]
pub struct FlightGraph<'a> {
    flights: &'a [FlightRecord],
    graph: StableDiGraph<AirportCode, usize>,
    code_to_index: HashMap<AirportCode, NodeIndex>,
    outgoing: HashMap<NodeIndex, Vec<(usize, NodeIndex)>>,
}

impl<'a> FlightGraph<'a> {
    /// Returns the number of distinct airports.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of flights.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Looks up the node for an airport code.
    pub fn node_index(&self, code: &str) -> Option<NodeIndex> {
        self.code_to_index.get(code).copied()
    }

    /// Returns the airport code stored on `idx`.
    pub fn airport(&self, idx: NodeIndex) -> Option<&AirportCode> {
        self.graph.node_weight(idx)
    }

    /// Node indices in discovery order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Outgoing flights of `idx` in record order. Empty for unknown indices.
    pub fn outgoing(&self, idx: NodeIndex) -> impl Iterator<Item = OutgoingLeg<'a>> + '_ {
        let flights = self.flights;
        self.outgoing
            .get(&idx)
            .into_iter()
            .flatten()
            .filter_map(move |&(record, target)| {
                flights.get(record).map(|flight| OutgoingLeg {
                    record,
                    flight,
                    target,
                })
            })
    }

    /// The record slice the graph was built from.
    pub fn flights(&self) -> &'a [FlightRecord] {
        self.flights
    }

    /// Returns a reference to the underlying [`StableDiGraph`].
    pub fn graph(&self) -> &StableDiGraph<AirportCode, usize> {
        &self.graph
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Builds the airport graph for `flights` in O(N) time.
///
/// Every record contributes one edge; parallel flights and self-loops are
/// kept. Construction cannot fail: the normalizer has already mapped every
/// endpoint to some airport code, possibly the sentinel.
pub fn build_graph(flights: &[FlightRecord]) -> FlightGraph<'_> {
    let mut graph: StableDiGraph<AirportCode, usize> =
        StableDiGraph::with_capacity(flights.len(), flights.len());
    let mut code_to_index: HashMap<AirportCode, NodeIndex> = HashMap::new();
    let mut outgoing: HashMap<NodeIndex, Vec<(usize, NodeIndex)>> = HashMap::new();

    let mut intern = |graph: &mut StableDiGraph<AirportCode, usize>, code: &AirportCode| {
        *code_to_index
            .entry(code.clone())
            .or_insert_with(|| graph.add_node(code.clone()))
    };

    for (record, flight) in flights.iter().enumerate() {
        let source = intern(&mut graph, &flight.source);
        let target = intern(&mut graph, &flight.target);
        graph.add_edge(source, target, record);
        outgoing.entry(source).or_default().push((record, target));
    }

    FlightGraph {
        flights,
        graph,
        code_to_index,
        outgoing,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
