//! Builtin function identifiers for O(1) comparison.
//!
//! The Context interns every builtin name at construction time, in
//! declaration order, so rules can compare function identities by
//! `SymbolId` instead of by string:
//!
//! ```rust,ignore
//! if ctx.is_builtin(*fn_id, BuiltinFn::Sin) { ... }
//! ```

use crate::symbol::SymbolId;

/// Known built-in functions with cached SymbolIds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BuiltinFn {
    // Trigonometric
    Sin = 0,
    Cos,
    Tan,

    // Logarithmic / Exponential
    Exp,
    Ln,

    // Roots / magnitude
    Sqrt,
    Abs,

    /// `sum(body, index, lower, upper)`, an indexed (possibly infinite) sum.
    Sum,
}

impl BuiltinFn {
    /// Total number of builtin functions.
    pub const COUNT: usize = 8;

    pub const ALL: [BuiltinFn; BuiltinFn::COUNT] = [
        BuiltinFn::Sin,
        BuiltinFn::Cos,
        BuiltinFn::Tan,
        BuiltinFn::Exp,
        BuiltinFn::Ln,
        BuiltinFn::Sqrt,
        BuiltinFn::Abs,
        BuiltinFn::Sum,
    ];

    /// Get the string name of this builtin function.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            BuiltinFn::Sin => "sin",
            BuiltinFn::Cos => "cos",
            BuiltinFn::Tan => "tan",
            BuiltinFn::Exp => "exp",
            BuiltinFn::Ln => "ln",
            BuiltinFn::Sqrt => "sqrt",
            BuiltinFn::Abs => "abs",
            BuiltinFn::Sum => "sum",
        }
    }

    /// Expected argument count.
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            BuiltinFn::Sum => 4,
            _ => 1,
        }
    }

    /// Look up a builtin by its name.
    pub fn from_name(name: &str) -> Option<BuiltinFn> {
        BuiltinFn::ALL.iter().copied().find(|b| b.name() == name)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Cache of builtin SymbolIds, filled by `Context::new`.
#[derive(Debug, Clone)]
pub struct BuiltinIds {
    ids: [SymbolId; BuiltinFn::COUNT],
}

impl BuiltinIds {
    pub(crate) fn new(ids: [SymbolId; BuiltinFn::COUNT]) -> Self {
        Self { ids }
    }

    #[inline]
    pub fn id(&self, builtin: BuiltinFn) -> SymbolId {
        self.ids[builtin.index()]
    }

    /// Reverse lookup: which builtin (if any) a SymbolId names.
    pub fn lookup(&self, id: SymbolId) -> Option<BuiltinFn> {
        self.ids
            .iter()
            .position(|&b| b == id)
            .map(|idx| BuiltinFn::ALL[idx])
    }
}
