use std::fmt;
use std::ops::{Range, RangeInclusive};
use z3::{ast::Bool, Context};
use crate::error::ReductionError;
use crate::step::StackSymbol;

/// Number of stack cells a path of `length` steps can touch.
///
/// Reaching height `h` and coming back down costs at least `2h` steps,
/// so heights `0..length / 2 + 1` are all a path can use.
pub fn stack_capacity(length: usize) -> usize {
    length / 2 + 1
}

/// The length bound of one reduction: positions `0..=length` and stack
/// heights `0..stack_capacity(length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathBound {
    length: usize,
}

impl PathBound {
    /// Validates a user supplied length. Negative lengths are rejected
    /// here rather than clamped to an empty formula.
    pub fn new(length: i64) -> Result<PathBound, ReductionError> {
        if length < 0 {
            return Err(ReductionError::NegativeLength(length));
        }
        let length = usize::try_from(length).map_err(|_| ReductionError::LengthTooLarge(length))?;
        Ok(PathBound { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn capacity(&self) -> usize {
        stack_capacity(self.length)
    }

    /// Every path position, start and end included.
    pub fn positions(&self) -> RangeInclusive<usize> {
        0..=self.length
    }

    pub fn heights(&self) -> Range<usize> {
        0..self.capacity()
    }
}

impl From<usize> for PathBound {
    fn from(length: usize) -> Self {
        PathBound { length }
    }
}

/// Identity of a propositional variable of the reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// The walk is at `node` at position `pos` with its stack top at `height`.
    Position { node: usize, pos: usize, height: usize },
    /// Stack cell `height` holds `symbol` at position `pos`.
    Symbol { pos: usize, height: usize, symbol: StackSymbol },
}

impl fmt::Display for VarKey {
    // Every index is tagged and delimited, so distinct keys never share a name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKey::Position { node, pos, height } => {
                write!(f, "x(node={node},pos={pos},height={height})")
            }
            VarKey::Symbol { pos, height, symbol } => {
                write!(f, "y(pos={pos},height={height},symbol={symbol})")
            }
        }
    }
}

/// Maps variable keys to Z3 constants.
///
/// Z3 interns constants by name, so asking twice for the same key yields
/// the same proposition. Reductions sharing one context must use distinct
/// namespaces to keep their variables apart.
#[derive(Clone)]
pub struct Naming<'ctx> {
    ctx: &'ctx Context,
    namespace: Option<String>,
}

impl<'ctx> Naming<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Naming { ctx, namespace: None }
    }

    pub fn with_namespace(ctx: &'ctx Context, namespace: impl Into<String>) -> Self {
        Naming {
            ctx,
            namespace: Some(namespace.into()),
        }
    }

    pub fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self, key: VarKey) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}/{key}"),
            None => key.to_string(),
        }
    }

    pub fn var(&self, key: VarKey) -> Bool<'ctx> {
        Bool::new_const(self.ctx, self.name(key))
    }

    pub fn position(&self, node: usize, pos: usize, height: usize) -> Bool<'ctx> {
        self.var(VarKey::Position { node, pos, height })
    }

    pub fn symbol(&self, pos: usize, height: usize, symbol: StackSymbol) -> Bool<'ctx> {
        self.var(VarKey::Symbol { pos, height, symbol })
    }
}
