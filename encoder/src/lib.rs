//! Reduction of bounded, stack-balanced reachability in a tunnel network to
//! propositional satisfiability, solved with Z3.
//!
//! A path of length `k` is modelled by two families of variables:
//! position variables `x(node, pos, height)` telling where the walk is and
//! how high its stack is, and symbol variables `y(pos, height, symbol)`
//! describing the stack cells. [`Reduction`] builds the formula,
//! [`extract_path`] reads a path back out of a model and [`write_model`]
//! prints a model for inspection.

mod assignment;
mod decode;
mod error;
mod naming;
mod reduction;
mod report;
mod solve;
mod step;

pub use assignment::{Assignment, Cell};
pub use decode::extract_path;
pub use error::{DecodeError, ReductionError, SolveError};
pub use naming::{stack_capacity, Naming, PathBound, VarKey};
pub use reduction::{build_reduction, Reduction};
pub use report::{render_model, write_model};
pub use solve::{PathFinder, Solution};
pub use step::{height_profile, Action, StackSymbol, Step};
