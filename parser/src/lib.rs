use std::fmt;
use std::fs;
use std::path::Path;
use indexmap::IndexSet;
use network::{NetworkError, TunnelNetwork};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "graph.pest"]
pub struct NetworkParser;

/// The two node roles a network needs exactly one of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("syntax error:\n{0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("no node is marked as {0}")]
    MissingEndpoint(Endpoint),

    #[error("both `{first}` and `{second}` are marked as {role}")]
    DuplicateEndpoint {
        role: Endpoint,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

// Collects nodes in first-appearance order while walking the statements.
#[derive(Default)]
struct NetworkBuilder {
    names: IndexSet<String>,
    edges: Vec<(usize, usize)>,
    source: Option<usize>,
    destination: Option<usize>,
}

impl NetworkBuilder {
    fn node(&mut self, name: &str) -> usize {
        self.names.insert_full(name.to_owned()).0
    }

    fn mark(&mut self, role: Endpoint, node: usize) -> Result<(), ParseError> {
        let slot = match role {
            Endpoint::Source => &mut self.source,
            Endpoint::Destination => &mut self.destination,
        };
        match *slot {
            Some(previous) if previous != node => Err(ParseError::DuplicateEndpoint {
                role,
                first: self.names[previous].clone(),
                second: self.names[node].clone(),
            }),
            _ => {
                *slot = Some(node);
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<TunnelNetwork, ParseError> {
        let source = self.source.ok_or(ParseError::MissingEndpoint(Endpoint::Source))?;
        let destination = self.destination.ok_or(ParseError::MissingEndpoint(Endpoint::Destination))?;
        let names: Vec<String> = self.names.into_iter().collect();
        Ok(TunnelNetwork::new(names, self.edges, source, destination)?)
    }
}

/// Parses a network written in the DOT subset described by `graph.pest`.
///
/// Nodes are numbered in the order they first appear. Exactly one node
/// must carry the `source` attribute and exactly one the `destination`
/// attribute (they may be the same node).
pub fn parse_network(source: &str) -> Result<TunnelNetwork, ParseError> {
    let network = NetworkParser::parse(Rule::network, source)
        .map_err(Box::new)?
        .next()
        .unwrap();

    let mut builder = NetworkBuilder::default();
    for statement in network.into_inner() {
        match statement.as_rule() {
            Rule::node_statement => build_node_statement(&mut builder, statement)?,
            Rule::edge_statement => build_edge_statement(&mut builder, statement),
            // graph name and EOI
            _ => (),
        }
    }
    builder.finish()
}

pub fn parse_network_file(path: impl AsRef<Path>) -> Result<TunnelNetwork, ParseError> {
    let source = fs::read_to_string(path)?;
    parse_network(&source)
}

fn build_node_statement(builder: &mut NetworkBuilder, pair: Pair<Rule>) -> Result<(), ParseError> {
    let mut pairs = pair.into_inner();
    let node = builder.node(node_name(pairs.next().unwrap()));

    if let Some(attributes) = pairs.next() {
        for attribute in attributes.into_inner() {
            let mut parts = attribute.into_inner();
            let key = parts.next().unwrap().as_str();
            // A bare attribute is a flag that is switched on
            let enabled = parts
                .next()
                .map_or(true, |value| matches!(node_name(value), "true" | "1"));
            if !enabled {
                continue;
            }
            match key {
                "source" => builder.mark(Endpoint::Source, node)?,
                "destination" | "dest" => builder.mark(Endpoint::Destination, node)?,
                // labels, colours and the like carry no meaning here
                _ => (),
            }
        }
    }
    Ok(())
}

fn build_edge_statement(builder: &mut NetworkBuilder, pair: Pair<Rule>) {
    let chain: Vec<usize> = pair
        .into_inner()
        .filter(|p| p.as_rule() != Rule::attribute_list)
        .map(|p| builder.node(node_name(p)))
        .collect();
    for hop in chain.windows(2) {
        builder.edges.push((hop[0], hop[1]));
    }
}

fn node_name<'i>(pair: Pair<'i, Rule>) -> &'i str {
    let text = pair.as_str();
    match pair.as_rule() {
        Rule::quoted => &text[1..text.len() - 1],
        _ => text,
    }
}
