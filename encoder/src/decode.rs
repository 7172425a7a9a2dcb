use log::trace;
use network::TunnelNetwork;
use z3::Model;
use crate::assignment::{Assignment, Cell};
use crate::error::DecodeError;
use crate::naming::{stack_capacity, Naming};
use crate::step::{Action, StackSymbol, Step};

fn configuration_at(
    assignment: &Assignment,
    network: &TunnelNetwork,
    capacity: usize,
    pos: usize,
) -> Result<(usize, usize), DecodeError> {
    match assignment.occupied(network, capacity, pos).as_slice() {
        [single] => Ok(*single),
        [] => Err(DecodeError::NoConfiguration { pos }),
        many => Err(DecodeError::AmbiguousConfiguration { pos, count: many.len() }),
    }
}

fn symbol_at(assignment: &Assignment, pos: usize, height: usize) -> Result<StackSymbol, DecodeError> {
    match assignment.cell(pos, height) {
        Cell::Holds(symbol) => Ok(symbol),
        Cell::Empty | Cell::Conflict => Err(DecodeError::IllDefinedCell { pos, height }),
    }
}

/// Reads the path out of a model of the reduction for length `bound`.
///
/// Returns one step per position `0..bound`. A model that does not have
/// exactly one configuration per position, or whose stack cells read by a
/// step are not well defined, is rejected rather than guessed at.
pub fn extract_path<'ctx>(
    model: &Model<'ctx>,
    naming: &Naming<'ctx>,
    network: &TunnelNetwork,
    bound: usize,
) -> Result<Vec<Step>, DecodeError> {
    let assignment = Assignment::new(model, naming);
    let capacity = stack_capacity(bound);
    let mut path = Vec::with_capacity(bound);

    for pos in 0..bound {
        let (from, from_height) = configuration_at(&assignment, network, capacity, pos)?;
        let (to, to_height) = configuration_at(&assignment, network, capacity, pos + 1)?;

        let action = if to_height == from_height {
            Action::Transmit(symbol_at(&assignment, pos, from_height)?)
        } else if to_height == from_height + 1 {
            Action::Push {
                below: symbol_at(&assignment, pos, from_height)?,
                pushed: symbol_at(&assignment, pos + 1, to_height)?,
            }
        } else if to_height + 1 == from_height {
            Action::Pop {
                popped: symbol_at(&assignment, pos, from_height)?,
                exposed: symbol_at(&assignment, pos + 1, to_height)?,
            }
        } else {
            return Err(DecodeError::HeightJump { pos, from: from_height, to: to_height });
        };

        trace!("pos {}: {} -> {} ({})", pos, from, to, action);
        path.push(Step::new(action, from, to));
    }
    Ok(path)
}
