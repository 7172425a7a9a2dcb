use std::fmt::{self, Write};
use network::TunnelNetwork;
use z3::Model;
use crate::assignment::{Assignment, Cell};
use crate::naming::{stack_capacity, Naming};

/// Writes, for every position `0..=bound`, the occupied (node, height)
/// pairs and the stack cells from height 0 upwards.
///
/// The stack line reads bottom to top: height 0 is the leftmost cell, so
/// `|4|6| ` is a base `4` with a `6` pushed on it.
///
/// Inconsistencies are reported inline as `Warning:` lines and never stop
/// the rendering: no or several occupied pairs, a cell holding both
/// symbols (`|X`), and a filled cell above an empty one.
pub fn write_model<'ctx, W: Write>(
    out: &mut W,
    model: &Model<'ctx>,
    naming: &Naming<'ctx>,
    network: &TunnelNetwork,
    bound: usize,
) -> fmt::Result {
    let assignment = Assignment::new(model, naming);
    let capacity = stack_capacity(bound);

    for pos in 0..=bound {
        writeln!(out, "At pos {pos}:")?;

        let occupied = assignment.occupied(network, capacity, pos);
        let pairs: Vec<String> = occupied
            .iter()
            .map(|&(node, height)| format!("({},{})", network.node_name(node), height))
            .collect();
        writeln!(out, "State: {}", pairs.join(" "))?;
        match occupied.len() {
            0 => writeln!(out, "Warning: no node at that position")?,
            1 => (),
            _ => writeln!(out, "Warning: several (node,height) pairs at that position")?,
        }

        let mut ill_defined = false;
        let mut above_top = false;
        write!(out, "Stack: ")?;
        for height in 0..capacity {
            match assignment.cell(pos, height) {
                Cell::Holds(symbol) => {
                    write!(out, "|{symbol}")?;
                    ill_defined |= above_top;
                }
                Cell::Conflict => {
                    write!(out, "|X")?;
                    ill_defined = true;
                }
                Cell::Empty => {
                    write!(out, "| ")?;
                    above_top = true;
                }
            }
        }
        writeln!(out)?;
        if ill_defined {
            writeln!(out, "Warning: ill-defined stack")?;
        }
    }
    Ok(())
}

pub fn render_model<'ctx>(model: &Model<'ctx>, naming: &Naming<'ctx>, network: &TunnelNetwork, bound: usize) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_model(&mut out, model, naming, network, bound);
    out
}
