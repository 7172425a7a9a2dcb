use network::TunnelNetwork;
use z3::{ast::Bool, Model};
use crate::naming::Naming;
use crate::step::StackSymbol;

/// Content of one stack cell under an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Holds(StackSymbol),
    /// Both symbols are true at once.
    Conflict,
}

/// Reads the reduction's variables out of a Z3 model.
pub struct Assignment<'m, 'ctx> {
    model: &'m Model<'ctx>,
    naming: &'m Naming<'ctx>,
}

impl<'m, 'ctx> Assignment<'m, 'ctx> {
    pub fn new(model: &'m Model<'ctx>, naming: &'m Naming<'ctx>) -> Self {
        Assignment { model, naming }
    }

    /// Variables the model leaves open count as false.
    pub fn value(&self, var: &Bool<'ctx>) -> bool {
        self.model
            .eval(var, true)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    /// Every (node, height) pair whose position variable holds at `pos`,
    /// ordered by node then height.
    pub fn occupied(&self, network: &TunnelNetwork, capacity: usize, pos: usize) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for node in 0..network.num_nodes() {
            for height in 0..capacity {
                if self.value(&self.naming.position(node, pos, height)) {
                    pairs.push((node, height));
                }
            }
        }
        pairs
    }

    pub fn cell(&self, pos: usize, height: usize) -> Cell {
        let four = self.value(&self.naming.symbol(pos, height, StackSymbol::Four));
        let six = self.value(&self.naming.symbol(pos, height, StackSymbol::Six));
        match (four, six) {
            (true, true) => Cell::Conflict,
            (true, false) => Cell::Holds(StackSymbol::Four),
            (false, true) => Cell::Holds(StackSymbol::Six),
            (false, false) => Cell::Empty,
        }
    }
}
