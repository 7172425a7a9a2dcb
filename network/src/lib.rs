use std::fmt;
use indexmap::IndexSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NetworkError {
    #[error("a tunnel network needs at least one node")]
    Empty,

    #[error("{role} index {index} is out of range for {num_nodes} nodes")]
    EndpointOutOfRange {
        role: &'static str,
        index: usize,
        num_nodes: usize,
    },

    #[error("edge {from} -> {to} refers to a node outside 0..{num_nodes}")]
    EdgeOutOfRange {
        from: usize,
        to: usize,
        num_nodes: usize,
    },

    #[error("two nodes are named `{0}`")]
    DuplicateName(String),

    #[error("node name {0:?} contains a double quote")]
    QuoteInName(String),
}

/// A directed graph of named nodes with a distinguished source and
/// destination. Nodes are addressed by their index `0..num_nodes()`.
///
/// The network is built once and only queried afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelNetwork {
    names: Vec<String>,
    // successors of each node, in insertion order, without duplicates
    adjacency: Vec<IndexSet<usize>>,
    source: usize,
    destination: usize,
}

impl TunnelNetwork {
    /// Builds a network from its node names and edge list.
    ///
    /// # Arguments
    /// * `names` - The display name of every node, index `i` naming node `i`
    /// * `edges` - The directed edges as `(from, to)` index pairs
    /// * `source` - Index of the node every path starts from
    /// * `destination` - Index of the node every path ends in
    ///
    /// # Returns
    /// * The network, or an error if any index is out of range or a name is
    ///   repeated or cannot be written as a DOT identifier
    pub fn new<S: Into<String>>(
        names: Vec<S>,
        edges: impl IntoIterator<Item = (usize, usize)>,
        source: usize,
        destination: usize,
    ) -> Result<Self, NetworkError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let num_nodes = names.len();
        if num_nodes == 0 {
            return Err(NetworkError::Empty);
        }
        let mut seen = IndexSet::with_capacity(num_nodes);
        for name in &names {
            if name.contains('"') {
                return Err(NetworkError::QuoteInName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(NetworkError::DuplicateName(name.clone()));
            }
        }
        if source >= num_nodes {
            return Err(NetworkError::EndpointOutOfRange { role: "source", index: source, num_nodes });
        }
        if destination >= num_nodes {
            return Err(NetworkError::EndpointOutOfRange { role: "destination", index: destination, num_nodes });
        }

        let mut adjacency = vec![IndexSet::new(); num_nodes];
        for (from, to) in edges {
            if from >= num_nodes || to >= num_nodes {
                return Err(NetworkError::EdgeOutOfRange { from, to, num_nodes });
            }
            adjacency[from].insert(to);
        }

        Ok(TunnelNetwork {
            names,
            adjacency,
            source,
            destination,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.names.len()
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(IndexSet::len).sum()
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn destination(&self) -> usize {
        self.destination
    }

    /// Panics if `node` is not a valid index.
    pub fn node_name(&self, node: usize) -> &str {
        &self.names[node]
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.adjacency
            .get(from)
            .map_or(false, |succ| succ.contains(&to))
    }

    /// Successors of `node` in the order their edges were added.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[node].iter().copied()
    }

    /// All edges, grouped by source node in index order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, succ)| succ.iter().map(move |&to| (from, to)))
    }
}

// A node name as it appears in DOT text, quoted unless it is a bare identifier.
struct DotName<'a>(&'a str);

impl fmt::Display for DotName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bare = !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if bare {
            write!(f, "{}", self.0)
        } else {
            write!(f, "\"{}\"", self.0)
        }
    }
}

impl fmt::Display for TunnelNetwork {
    /// Renders the network in the DOT subset accepted by the parser.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph tunnels {{")?;
        for (node, name) in self.names.iter().enumerate() {
            let mut attributes = Vec::new();
            if node == self.source {
                attributes.push("source");
            }
            if node == self.destination {
                attributes.push("destination");
            }
            let name = DotName(name);
            if attributes.is_empty() {
                writeln!(f, "    {};", name)?;
            } else {
                writeln!(f, "    {} [{}];", name, attributes.join(", "))?;
            }
        }
        for (from, to) in self.edges() {
            writeln!(f, "    {} -> {};", DotName(&self.names[from]), DotName(&self.names[to]))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TunnelNetwork {
        TunnelNetwork::new(vec!["a", "b", "c"], vec![(0, 1), (1, 2), (2, 0)], 0, 2).unwrap()
    }

    #[test]
    fn test_accessors() {
        let network = triangle();
        assert_eq!(network.num_nodes(), 3);
        assert_eq!(network.num_edges(), 3);
        assert_eq!(network.source(), 0);
        assert_eq!(network.destination(), 2);
        assert_eq!(network.node_name(1), "b");
        assert!(network.has_edge(2, 0));
        assert!(!network.has_edge(0, 2));
        assert!(!network.has_edge(7, 0));
        assert_eq!(network.successors(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(network.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let network = TunnelNetwork::new(vec!["a", "b"], vec![(0, 1), (0, 1), (1, 1)], 0, 1).unwrap();
        assert_eq!(network.num_edges(), 2);
        assert!(network.has_edge(1, 1));
    }

    #[test]
    fn test_rejects_bad_indices() {
        assert_eq!(
            TunnelNetwork::new(Vec::<String>::new(), vec![], 0, 0),
            Err(NetworkError::Empty)
        );
        assert_eq!(
            TunnelNetwork::new(vec!["a"], vec![], 0, 3),
            Err(NetworkError::EndpointOutOfRange { role: "destination", index: 3, num_nodes: 1 })
        );
        assert_eq!(
            TunnelNetwork::new(vec!["a", "b"], vec![(0, 2)], 0, 1),
            Err(NetworkError::EdgeOutOfRange { from: 0, to: 2, num_nodes: 2 })
        );
    }

    #[test]
    fn test_rejects_bad_names() {
        assert_eq!(
            TunnelNetwork::new(vec!["a", "b", "a"], vec![(0, 1)], 0, 1),
            Err(NetworkError::DuplicateName("a".to_owned()))
        );
        assert_eq!(
            TunnelNetwork::new(vec!["say \"hi\""], vec![], 0, 0),
            Err(NetworkError::QuoteInName("say \"hi\"".to_owned()))
        );
    }

    #[test]
    fn test_display_quotes_non_identifiers() {
        let network = TunnelNetwork::new(vec!["main hall", "exit-1", "cave_2", ""], vec![(0, 1), (1, 2), (2, 3)], 0, 1).unwrap();
        assert_eq!(
            network.to_string(),
            "digraph tunnels {\n    \"main hall\" [source];\n    \"exit-1\" [destination];\n    cave_2;\n    \"\";\n    \
             \"main hall\" -> \"exit-1\";\n    \"exit-1\" -> cave_2;\n    cave_2 -> \"\";\n}"
        );
    }

    #[test]
    fn test_display_as_dot() {
        let network = TunnelNetwork::new(vec!["s", "d"], vec![(0, 1)], 0, 1).unwrap();
        assert_eq!(
            network.to_string(),
            "digraph tunnels {\n    s [source];\n    d [destination];\n    s -> d;\n}"
        );
    }
}
