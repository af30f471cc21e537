//! Symbol interning for variable and function names.
//!
//! All names are stored once and referenced by `SymbolId`. A symbol may also
//! carry [`Assumptions`] (integer, positive, nonzero) recorded when it is
//! declared; undeclared symbols are treated as arbitrary reals.

use rustc_hash::FxHashMap;

/// Unique identifier for an interned symbol.
///
/// Using usize for direct Vec indexing without casts.
pub type SymbolId = usize;

/// Facts known about the values a symbol can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Assumptions {
    pub integer: bool,
    pub positive: bool,
    pub nonzero: bool,
}

impl Assumptions {
    /// No facts: an arbitrary real value.
    pub const NONE: Assumptions = Assumptions {
        integer: false,
        positive: false,
        nonzero: false,
    };

    /// Integer and strictly positive (1, 2, 3, ...). Used for summation indices.
    pub const fn positive_integer() -> Self {
        Assumptions {
            integer: true,
            positive: true,
            nonzero: true,
        }
    }

    /// Strictly positive real.
    pub const fn positive() -> Self {
        Assumptions {
            integer: false,
            positive: true,
            nonzero: true,
        }
    }

    #[inline]
    pub fn is_nonzero(&self) -> bool {
        self.nonzero || self.positive
    }
}

/// Symbol table for interning names.
///
/// # Design
/// - `strings`: canonical storage, indexed by SymbolId
/// - `lookup`: reverse map for O(1) intern check
/// - `declared`: assumptions for symbols that went through `declare`
/// - `dummies`: symbols with a display name but no entry in `lookup`, so
///   parsing or `intern` can never reach them
///
/// # Thread Safety
/// Not thread-safe. Intended for single-threaded use within Context.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    strings: Vec<String>,
    lookup: FxHashMap<String, SymbolId>,
    declared: FxHashMap<SymbolId, Assumptions>,
    dummies: FxHashMap<(String, Assumptions), SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its SymbolId.
    ///
    /// If the string is already interned, returns the existing id.
    pub fn intern(&mut self, s: &str) -> SymbolId {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }

        let id = self.strings.len();
        let owned = s.to_string();
        self.strings.push(owned.clone());
        self.lookup.insert(owned, id);
        id
    }

    /// A symbol printed as `name` but distinct from `intern(name)`.
    ///
    /// Repeated requests with the same name and assumptions return the same id.
    pub fn dummy(&mut self, name: &str, assumptions: Assumptions) -> SymbolId {
        let key = (name.to_string(), assumptions);
        if let Some(&id) = self.dummies.get(&key) {
            return id;
        }

        let id = self.strings.len();
        self.strings.push(name.to_string());
        self.declared.insert(id, assumptions);
        self.dummies.insert(key, id);
        id
    }

    #[inline]
    pub fn is_dummy(&self, id: SymbolId) -> bool {
        self.dummies.values().any(|&d| d == id)
    }

    /// Resolve a SymbolId back to its string.
    ///
    /// # Panics
    /// Panics if id is invalid (out of bounds).
    #[inline]
    pub fn resolve(&self, id: SymbolId) -> &str {
        &self.strings[id]
    }

    /// Get id for a string if it exists, without interning.
    #[inline]
    pub fn get_id(&self, s: &str) -> Option<SymbolId> {
        self.lookup.get(s).copied()
    }

    /// Record assumptions for a symbol.
    ///
    /// Re-declaring with identical assumptions is a no-op. Declaring with
    /// different assumptions returns the existing ones as the error.
    pub fn declare(&mut self, id: SymbolId, assumptions: Assumptions) -> Result<(), Assumptions> {
        match self.declared.get(&id) {
            Some(existing) if *existing != assumptions => Err(*existing),
            Some(_) => Ok(()),
            None => {
                self.declared.insert(id, assumptions);
                Ok(())
            }
        }
    }

    /// Assumptions recorded for `id`, if it was declared.
    #[inline]
    pub fn declared(&self, id: SymbolId) -> Option<Assumptions> {
        self.declared.get(&id).copied()
    }

    /// Assumptions for `id`, defaulting to [`Assumptions::NONE`].
    #[inline]
    pub fn assumptions(&self, id: SymbolId) -> Assumptions {
        self.declared(id).unwrap_or(Assumptions::NONE)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
