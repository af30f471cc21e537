use cas_ast::{Context, ExprId};

/// Result of a rule application containing the new expression and metadata
pub struct Rewrite {
    /// The transformed expression
    pub new_expr: ExprId,
    /// Human-readable description of the transformation
    pub description: String,
}

impl Rewrite {
    pub fn simple(new_expr: ExprId, description: impl Into<String>) -> Self {
        Rewrite {
            new_expr,
            description: description.into(),
        }
    }
}

/// A local rewrite offered every function call and non-integer power the
/// simplifier meets. Operands are already in canonical form when `apply`
/// runs, and the returned expression is simplified again.
pub trait Rule {
    fn name(&self) -> &str;

    fn apply(&self, context: &mut Context, expr: ExprId) -> Option<Rewrite>;

    // Optional: Return list of Expr variant names this rule targets.
    // The simplifier only consults "Function" and "Pow".
    fn target_types(&self) -> Option<Vec<&str>> {
        None
    }
}
