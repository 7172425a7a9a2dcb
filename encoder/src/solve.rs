use log::{debug, info};
use network::TunnelNetwork;
use z3::{ast::Bool, Context, Model, SatResult, Solver};
use crate::decode::extract_path;
use crate::error::{ReductionError, SolveError};
use crate::naming::{Naming, PathBound};
use crate::reduction::Reduction;
use crate::report::render_model;
use crate::step::Step;

/// A path found by the solver, with the model it was read from.
pub struct Solution<'ctx> {
    pub length: usize,
    pub path: Vec<Step>,
    pub model: Model<'ctx>,
}

/// Runs reductions of one network against Z3.
///
/// Each length is checked with a fresh solver; all formulas share the
/// finder's context and namespace.
pub struct PathFinder<'a, 'ctx> {
    network: &'a TunnelNetwork,
    naming: Naming<'ctx>,
}

impl<'a, 'ctx> PathFinder<'a, 'ctx> {
    pub fn new(ctx: &'ctx Context, network: &'a TunnelNetwork) -> Self {
        PathFinder {
            network,
            naming: Naming::new(ctx),
        }
    }

    pub fn with_naming(naming: Naming<'ctx>, network: &'a TunnelNetwork) -> Self {
        PathFinder { network, naming }
    }

    pub fn naming(&self) -> &Naming<'ctx> {
        &self.naming
    }

    pub fn formula(&self, length: i64) -> Result<Bool<'ctx>, ReductionError> {
        let bound = PathBound::new(length)?;
        Ok(Reduction::new(self.naming.clone(), self.network, bound).build())
    }

    /// Checks a single length.
    ///
    /// # Returns
    /// * `Ok(Some(_))` with the decoded path if the reduction is satisfiable
    /// * `Ok(None)` if no simple path of that length exists
    /// * `Err(_)` if the length is invalid, the solver gives up, or the
    ///   model cannot be decoded
    pub fn find(&self, length: i64) -> Result<Option<Solution<'ctx>>, SolveError> {
        self.find_bounded(PathBound::new(length)?)
    }

    fn find_bounded(&self, bound: PathBound) -> Result<Option<Solution<'ctx>>, SolveError> {
        let formula = Reduction::new(self.naming.clone(), self.network, bound).build();
        let length = bound.length();

        let solver = Solver::new(self.naming.ctx());
        solver.assert(&formula);
        match solver.check() {
            SatResult::Unsat => {
                debug!("length {}: unsatisfiable", length);
                Ok(None)
            }
            SatResult::Unknown => {
                let reason = solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "no reason given".to_owned());
                Err(SolveError::Unknown(reason))
            }
            SatResult::Sat => {
                let model = solver
                    .get_model()
                    .ok_or_else(|| SolveError::Unknown("satisfiable but no model".to_owned()))?;
                debug!("length {}: satisfiable", length);
                if log::log_enabled!(log::Level::Trace) {
                    log::trace!("model:\n{}", render_model(&model, &self.naming, self.network, length));
                }
                let path = extract_path(&model, &self.naming, self.network, length)?;
                Ok(Some(Solution { length, path, model }))
            }
        }
    }

    /// Tries every length from 0 to `max_length` and returns the first
    /// (shortest) one that has a path.
    pub fn search(&self, max_length: usize) -> Result<Option<Solution<'ctx>>, SolveError> {
        for length in 0..=max_length {
            if let Some(solution) = self.find_bounded(PathBound::from(length))? {
                info!("shortest path has length {}", solution.length);
                return Ok(Some(solution));
            }
        }
        Ok(None)
    }
}
