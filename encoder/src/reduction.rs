use log::{debug, trace};
use network::TunnelNetwork;
use z3::{ast::{Ast, Bool}, Context};
use crate::error::ReductionError;
use crate::naming::{Naming, PathBound};
use crate::step::{Action, StackSymbol};

pub(crate) fn and_all<'ctx>(ctx: &'ctx Context, constraints: &[Bool<'ctx>]) -> Bool<'ctx> {
    let refs: Vec<&Bool> = constraints.iter().collect();
    Bool::and(ctx, &refs)
}

pub(crate) fn or_all<'ctx>(ctx: &'ctx Context, constraints: &[Bool<'ctx>]) -> Bool<'ctx> {
    let refs: Vec<&Bool> = constraints.iter().collect();
    Bool::or(ctx, &refs)
}

// Pairwise exclusion: no two of `vars` hold together.
fn at_most_one<'ctx>(ctx: &'ctx Context, vars: &[Bool<'ctx>]) -> Vec<Bool<'ctx>> {
    let mut constraints = Vec::new();
    for (i, first) in vars.iter().enumerate() {
        for second in &vars[i + 1..] {
            constraints.push(Bool::and(ctx, &[first, second]).not());
        }
    }
    constraints
}

/// The propositional encoding of "there is a simple path of exactly
/// `bound.length()` steps from source to destination whose stack moves
/// start and end with the single base symbol".
///
/// The formula is the conjunction of four parts, each available on its own:
/// [`boundary_conditions`](Self::boundary_conditions),
/// [`unique_configuration`](Self::unique_configuration),
/// [`simple_path`](Self::simple_path) and
/// [`valid_transitions`](Self::valid_transitions).
pub struct Reduction<'a, 'ctx> {
    naming: Naming<'ctx>,
    network: &'a TunnelNetwork,
    bound: PathBound,
}

impl<'a, 'ctx> Reduction<'a, 'ctx> {
    pub fn new(naming: Naming<'ctx>, network: &'a TunnelNetwork, bound: PathBound) -> Self {
        Reduction { naming, network, bound }
    }

    pub fn naming(&self) -> &Naming<'ctx> {
        &self.naming
    }

    pub fn bound(&self) -> PathBound {
        self.bound
    }

    fn ctx(&self) -> &'ctx Context {
        self.naming.ctx()
    }

    /// The cell holds `symbol` and not the other one.
    fn holds(&self, pos: usize, height: usize, symbol: StackSymbol) -> Bool<'ctx> {
        Bool::and(self.ctx(), &[
            &self.naming.symbol(pos, height, symbol),
            &self.naming.symbol(pos, height, symbol.other()).not(),
        ])
    }

    fn empty(&self, pos: usize, height: usize) -> Bool<'ctx> {
        Bool::and(self.ctx(), &[
            &self.naming.symbol(pos, height, StackSymbol::Four).not(),
            &self.naming.symbol(pos, height, StackSymbol::Six).not(),
        ])
    }

    /// The cell has the same content at `pos` and `pos + 1`.
    fn unchanged(&self, pos: usize, height: usize) -> Bool<'ctx> {
        let kept: Vec<Bool> = StackSymbol::ALL
            .iter()
            .map(|&symbol| {
                self.naming
                    .symbol(pos, height, symbol)
                    ._eq(&self.naming.symbol(pos + 1, height, symbol))
            })
            .collect();
        and_all(self.ctx(), &kept)
    }

    /// All position variables of one position.
    fn configurations(&self, pos: usize) -> Vec<Bool<'ctx>> {
        let mut vars = Vec::new();
        for node in 0..self.network.num_nodes() {
            for height in self.bound.heights() {
                vars.push(self.naming.position(node, pos, height));
            }
        }
        vars
    }

    // Pins `node` at height 0 with only the base symbol on the stack.
    fn endpoint(&self, node: usize, pos: usize) -> Vec<Bool<'ctx>> {
        let mut constraints = Vec::new();
        for other in 0..self.network.num_nodes() {
            for height in self.bound.heights() {
                let var = self.naming.position(other, pos, height);
                if other == node && height == 0 {
                    constraints.push(var);
                } else {
                    constraints.push(var.not());
                }
            }
        }
        constraints.push(self.holds(pos, 0, StackSymbol::BASE));
        for height in 1..self.bound.capacity() {
            constraints.push(self.empty(pos, height));
        }
        constraints
    }

    /// The walk starts at the source and ends at the destination, both
    /// times at height 0 with only the base symbol on the stack.
    pub fn boundary_conditions(&self) -> Bool<'ctx> {
        let mut constraints = self.endpoint(self.network.source(), 0);
        constraints.extend(self.endpoint(self.network.destination(), self.bound.length()));
        trace!("boundary conditions: {} constraints", constraints.len());
        and_all(self.ctx(), &constraints)
    }

    /// Exactly one (node, height) pair holds at every position.
    pub fn unique_configuration(&self) -> Bool<'ctx> {
        let mut constraints = Vec::new();
        for pos in self.bound.positions() {
            let vars = self.configurations(pos);
            constraints.push(or_all(self.ctx(), &vars));
            constraints.extend(at_most_one(self.ctx(), &vars));
        }
        trace!("unique configuration: {} constraints", constraints.len());
        and_all(self.ctx(), &constraints)
    }

    /// No node is occupied at two different positions, whatever the heights.
    pub fn simple_path(&self) -> Bool<'ctx> {
        let mut constraints = Vec::new();
        for node in 0..self.network.num_nodes() {
            let visits: Vec<Bool> = self
                .bound
                .positions()
                .map(|pos| {
                    let at_pos: Vec<Bool> = self
                        .bound
                        .heights()
                        .map(|height| self.naming.position(node, pos, height))
                        .collect();
                    or_all(self.ctx(), &at_pos)
                })
                .collect();
            constraints.extend(at_most_one(self.ctx(), &visits));
        }
        trace!("simple path: {} constraints", constraints.len());
        and_all(self.ctx(), &constraints)
    }

    /// The stack at `pos + 1` after applying `action` to a stack topped at
    /// `height` at `pos`. Cells under both tops are carried over and
    /// everything above the new top is empty.
    fn stack_effect(&self, pos: usize, height: usize, target: usize, action: Action) -> Bool<'ctx> {
        let mut parts = Vec::new();
        for cell in 0..=height.min(target) {
            parts.push(self.unchanged(pos, cell));
        }
        match action {
            Action::Transmit(top) => {
                parts.push(self.naming.symbol(pos, height, top));
            }
            Action::Push { below, pushed } => {
                parts.push(self.naming.symbol(pos, height, below));
                parts.push(self.holds(pos + 1, target, pushed));
            }
            Action::Pop { popped, exposed } => {
                parts.push(self.naming.symbol(pos, height, popped));
                parts.push(self.naming.symbol(pos, target, exposed));
            }
        }
        for cell in target + 1..self.bound.capacity() {
            parts.push(self.empty(pos + 1, cell));
        }
        and_all(self.ctx(), &parts)
    }

    /// Every occupied configuration, except the last one, moves along an
    /// edge of the network with one stack action that keeps the height in
    /// range. A node without successors can therefore only be the last one.
    pub fn valid_transitions(&self) -> Bool<'ctx> {
        let mut constraints = Vec::new();
        for pos in 0..self.bound.length() {
            for height in self.bound.heights() {
                // The stack side of a move does not depend on the nodes
                let effects: Vec<(usize, Bool)> = Action::all()
                    .filter_map(|action| {
                        let target = action.target_height(height, self.bound.capacity())?;
                        Some((target, self.stack_effect(pos, height, target, action)))
                    })
                    .collect();

                for node in 0..self.network.num_nodes() {
                    let mut moves = Vec::new();
                    for next in self.network.successors(node) {
                        for (target, effect) in &effects {
                            let arrive = self.naming.position(next, pos + 1, *target);
                            moves.push(Bool::and(self.ctx(), &[&arrive, effect]));
                        }
                    }
                    let here = self.naming.position(node, pos, height);
                    constraints.push(here.implies(&or_all(self.ctx(), &moves)));
                }
            }
        }
        trace!("valid transitions: {} constraints", constraints.len());
        and_all(self.ctx(), &constraints)
    }

    pub fn build(&self) -> Bool<'ctx> {
        debug!(
            "building reduction: {} nodes, {} edges, length {}, stack capacity {}",
            self.network.num_nodes(),
            self.network.num_edges(),
            self.bound.length(),
            self.bound.capacity()
        );
        let parts = [
            self.boundary_conditions(),
            self.unique_configuration(),
            self.simple_path(),
            self.valid_transitions(),
        ];
        and_all(self.ctx(), &parts)
    }
}

/// Builds the formula that is satisfiable iff `network` has a simple path
/// of exactly `length` steps with a balanced stack.
///
/// # Arguments
/// * `ctx` - The Z3 context owning the formula
/// * `network` - The network, only read
/// * `length` - The number of steps; negative values are rejected
pub fn build_reduction<'ctx>(ctx: &'ctx Context, network: &TunnelNetwork, length: i64) -> Result<Bool<'ctx>, ReductionError> {
    let bound = PathBound::new(length)?;
    Ok(Reduction::new(Naming::new(ctx), network, bound).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::{Config, SatResult, Solver};

    fn check(ctx: &Context, formula: &Bool) -> SatResult {
        let solver = Solver::new(ctx);
        solver.assert(formula);
        solver.check()
    }

    fn two_nodes() -> TunnelNetwork {
        TunnelNetwork::new(vec!["a", "b"], vec![(0, 1)], 0, 1).unwrap()
    }

    fn cycle(source: usize, destination: usize) -> TunnelNetwork {
        TunnelNetwork::new(vec!["a", "b", "c"], vec![(0, 1), (1, 2), (2, 0)], source, destination).unwrap()
    }

    #[test]
    fn test_negative_length_is_rejected() {
        let ctx = Context::new(&Config::new());
        assert_eq!(
            build_reduction(&ctx, &two_nodes(), -3).unwrap_err(),
            ReductionError::NegativeLength(-3)
        );
    }

    #[test]
    fn test_length_zero() {
        let ctx = Context::new(&Config::new());
        let same = TunnelNetwork::new(vec!["a", "b"], vec![(0, 1)], 1, 1).unwrap();
        assert_eq!(check(&ctx, &build_reduction(&ctx, &same, 0).unwrap()), SatResult::Sat);
        assert_eq!(check(&ctx, &build_reduction(&ctx, &two_nodes(), 0).unwrap()), SatResult::Unsat);
    }

    #[test]
    fn test_single_edge() {
        let ctx = Context::new(&Config::new());
        let network = two_nodes();
        assert_eq!(check(&ctx, &build_reduction(&ctx, &network, 1).unwrap()), SatResult::Sat);
        // b has no successor and a cannot be visited twice
        assert_eq!(check(&ctx, &build_reduction(&ctx, &network, 2).unwrap()), SatResult::Unsat);
    }

    #[test]
    fn test_cycle_back_to_source_is_not_simple() {
        let ctx = Context::new(&Config::new());
        let network = cycle(0, 0);
        assert_eq!(check(&ctx, &build_reduction(&ctx, &network, 1).unwrap()), SatResult::Unsat);
        assert_eq!(check(&ctx, &build_reduction(&ctx, &network, 3).unwrap()), SatResult::Unsat);
    }

    #[test]
    fn test_only_the_existing_route() {
        let ctx = Context::new(&Config::new());
        let network = cycle(0, 2);
        assert_eq!(check(&ctx, &build_reduction(&ctx, &network, 2).unwrap()), SatResult::Sat);
        // only a -> b -> c exists, so no other length works
        assert_eq!(check(&ctx, &build_reduction(&ctx, &network, 1).unwrap()), SatResult::Unsat);
        assert_eq!(check(&ctx, &build_reduction(&ctx, &network, 3).unwrap()), SatResult::Unsat);
    }

    #[test]
    fn test_no_move_along_missing_edges() {
        let ctx = Context::new(&Config::new());
        // c is isolated
        let network = TunnelNetwork::new(vec!["a", "b", "c"], vec![(0, 1), (1, 0)], 0, 2).unwrap();
        for length in 0..4 {
            let formula = build_reduction(&ctx, &network, length).unwrap();
            assert_eq!(check(&ctx, &formula), SatResult::Unsat, "length {length}");
        }
    }

    #[test]
    fn test_push_and_pop_can_replace_transmits() {
        let ctx = Context::new(&Config::new());
        let network = TunnelNetwork::new(
            vec!["a", "b", "c", "d", "e"],
            vec![(0, 1), (1, 2), (2, 3), (3, 4)],
            0,
            4,
        )
        .unwrap();
        let naming = Naming::new(&ctx);
        let reduction = Reduction::new(naming.clone(), &network, PathBound::from(4));
        assert_eq!(check(&ctx, &reduction.build()), SatResult::Sat);

        // Forbid keeping the height along any step
        let mut no_transmit = vec![reduction.build()];
        for pos in 0..4 {
            for node in 0..4 {
                for height in reduction.bound().heights() {
                    let here = naming.position(node, pos, height);
                    let there = naming.position(node + 1, pos + 1, height);
                    no_transmit.push(Bool::and(&ctx, &[&here, &there]).not());
                }
            }
        }
        assert_eq!(check(&ctx, &and_all(&ctx, &no_transmit)), SatResult::Sat);

        // Reaching height 2 in the middle is push, push, pop, pop
        let peak = Bool::and(&ctx, &[&reduction.build(), &naming.position(2, 2, 2)]);
        assert_eq!(check(&ctx, &peak), SatResult::Sat);
    }

    #[test]
    fn test_pushed_cell_must_be_popped_before_the_end() {
        let ctx = Context::new(&Config::new());
        let network = TunnelNetwork::new(vec!["a", "b", "c"], vec![(0, 1), (1, 2)], 0, 2).unwrap();
        let naming = Naming::new(&ctx);
        let reduction = Reduction::new(naming.clone(), &network, PathBound::from(2));
        let pushed_first = Bool::and(&ctx, &[&reduction.build(), &naming.position(1, 1, 1)]);
        assert_eq!(check(&ctx, &pushed_first), SatResult::Sat);
        let kept_first = Bool::and(&ctx, &[&reduction.build(), &naming.position(1, 1, 0)]);
        assert_eq!(check(&ctx, &kept_first), SatResult::Sat);
        // a six on top at the end is not the base stack
        let six_left = Bool::and(&ctx, &[&reduction.build(), &naming.symbol(2, 0, StackSymbol::Six)]);
        assert_eq!(check(&ctx, &six_left), SatResult::Unsat);
    }

    #[test]
    fn test_parts_on_their_own() {
        let ctx = Context::new(&Config::new());
        let network = two_nodes();
        let reduction = Reduction::new(Naming::new(&ctx), &network, PathBound::from(0));
        // source and destination differ, so both can not hold at position 0
        assert_eq!(check(&ctx, &reduction.boundary_conditions()), SatResult::Unsat);
        assert_eq!(check(&ctx, &reduction.unique_configuration()), SatResult::Sat);
        assert_eq!(check(&ctx, &reduction.simple_path()), SatResult::Sat);
        assert_eq!(check(&ctx, &reduction.valid_transitions()), SatResult::Sat);

        let longer = Reduction::new(Naming::new(&ctx), &network, PathBound::from(3));
        assert_eq!(check(&ctx, &longer.boundary_conditions()), SatResult::Sat);
        let both = Bool::and(&ctx, &[&longer.unique_configuration(), &longer.simple_path()]);
        // four positions, two nodes, no revisits
        assert_eq!(check(&ctx, &Bool::and(&ctx, &[&both, &longer.boundary_conditions()])), SatResult::Unsat);
    }

    #[test]
    fn test_building_twice_gives_the_same_formula() {
        let ctx = Context::new(&Config::new());
        let network = cycle(0, 2);
        let first = build_reduction(&ctx, &network, 2).unwrap();
        let second = build_reduction(&ctx, &network, 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(check(&ctx, &first), check(&ctx, &second));
    }
}
