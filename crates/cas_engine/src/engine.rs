use crate::assumptions::{self, Sign};
use crate::lowering::{Lowerer, RewriteHook};
use crate::normal_form::NormalForm;
use crate::options::SimplifyOptions;
use crate::rule::Rule;
use crate::step::Step;
use cas_ast::{Context, ExprId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

use tracing::{debug, trace};

pub struct Simplifier {
    pub context: Context,
    rules: FxHashMap<String, Vec<Rc<dyn Rule>>>,
    disabled_rules: FxHashSet<String>,
    pub collect_steps: bool,
    pub options: SimplifyOptions,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the registered rules to the nodes offered during lowering.
struct RuleHook<'a> {
    rules: &'a FxHashMap<String, Vec<Rc<dyn Rule>>>,
    disabled_rules: &'a FxHashSet<String>,
    collect_steps: bool,
    steps: Vec<Step>,
}

impl RewriteHook for RuleHook<'_> {
    fn rewrite(&mut self, ctx: &mut Context, node: ExprId) -> Option<ExprId> {
        let candidates = self.rules.get(ctx.get(node).kind_name())?;
        for rule in candidates {
            if self.disabled_rules.contains(rule.name()) {
                continue;
            }
            if let Some(rewrite) = rule.apply(ctx, node) {
                trace!(rule = rule.name(), description = %rewrite.description, "rewrite");
                if self.collect_steps {
                    self.steps.push(Step::new(
                        &rewrite.description,
                        rule.name(),
                        node,
                        rewrite.new_expr,
                        Some(&*ctx),
                    ));
                }
                return Some(rewrite.new_expr);
            }
        }
        None
    }
}

impl Simplifier {
    pub fn new() -> Self {
        Self {
            context: Context::new(),
            rules: FxHashMap::default(),
            disabled_rules: FxHashSet::default(),
            collect_steps: true,
            options: SimplifyOptions::default(),
        }
    }

    pub fn with_default_rules() -> Self {
        let mut s = Self::new();
        s.register_default_rules();
        s
    }

    /// Reuse an existing context, e.g. one a parser already filled.
    pub fn with_context(context: Context) -> Self {
        let mut s = Self::with_default_rules();
        s.context = context;
        s
    }

    pub fn disable_rule(&mut self, rule_name: &str) {
        self.disabled_rules.insert(rule_name.to_string());
    }

    pub fn enable_rule(&mut self, rule_name: &str) {
        self.disabled_rules.remove(rule_name);
    }

    pub fn register_default_rules(&mut self) {
        use crate::rules::*;

        // exp and sqrt become powers before anything inspects them
        exponents::register(self);
        logarithms::register(self);
        trigonometry::register(self);
        functions::register(self);
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        let rule_rc: Rc<dyn Rule> = rule.into();
        let targets = rule_rc
            .target_types()
            .unwrap_or_else(|| vec!["Function", "Pow"]);
        for target in targets {
            self.rules
                .entry(target.to_string())
                .or_default()
                .push(rule_rc.clone());
        }
    }

    pub fn get_all_rule_names(&self) -> Vec<String> {
        let names: FxHashSet<String> = self
            .rules
            .values()
            .flatten()
            .map(|rule| rule.name().to_string())
            .collect();

        let mut sorted_names: Vec<String> = names.into_iter().collect();
        sorted_names.sort();
        sorted_names
    }

    /// Lower `expr` into its canonical normal form, applying the rules.
    pub fn normal_form(&mut self, expr: ExprId) -> (NormalForm, Vec<Step>) {
        let hook = RuleHook {
            rules: &self.rules,
            disabled_rules: &self.disabled_rules,
            collect_steps: self.collect_steps,
            steps: Vec::new(),
        };
        let mut lowerer = Lowerer::new(&mut self.context, hook, self.options);
        let nf = lowerer.lower(expr);
        let steps = lowerer.into_hook().steps;
        (nf, steps)
    }

    pub fn simplify(&mut self, expr_id: ExprId) -> (ExprId, Vec<Step>) {
        let (nf, steps) = self.normal_form(expr_id);
        let result = nf.build(&mut self.context);
        debug!(
            terms = nf.len(),
            steps = steps.len(),
            nodes = self.context.len(),
            "simplified"
        );
        (result, steps)
    }

    /// `true` when `expr` simplifies to the literal `0`.
    ///
    /// A coefficient that vanishes only through an identity the rules do not
    /// know is reported as nonzero.
    pub fn is_zero(&mut self, expr: ExprId) -> bool {
        let (result, _) = self.simplify(expr);
        self.context.is_zero_literal(result)
    }

    pub fn sign(&mut self, expr: ExprId) -> Option<Sign> {
        let (nf, _) = self.normal_form(expr);
        assumptions::sign(&self.context, &nf)
    }

    pub fn is_positive(&mut self, expr: ExprId) -> bool {
        self.sign(expr) == Some(Sign::Positive)
    }

    pub fn is_nonzero(&mut self, expr: ExprId) -> bool {
        let (nf, _) = self.normal_form(expr);
        assumptions::is_nonzero(&self.context, &nf)
    }

    pub fn is_integer(&mut self, expr: ExprId) -> bool {
        let (nf, _) = self.normal_form(expr);
        assumptions::is_integer_valued(&self.context, &nf)
    }

    pub fn are_equivalent(&mut self, a: ExprId, b: ExprId) -> bool {
        let (na, _) = self.normal_form(a);
        let (nb, _) = self.normal_form(b);
        (&na - &nb).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cas_ast::{BuiltinFn, DisplayExpr, Expr};

    #[test]
    fn test_rule_registry_by_target() {
        let s = Simplifier::with_default_rules();
        let names = s.get_all_rule_names();
        assert!(names.contains(&"Evaluate Trigonometric Functions".to_string()));
        assert!(names.contains(&"Exponential Of Logarithm".to_string()));
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let mut s = Simplifier::with_default_rules();
        s.disable_rule("Evaluate Trigonometric Functions");
        let zero = s.context.num(0);
        let sin0 = s.context.call_builtin(BuiltinFn::Sin, vec![zero]);
        let (result, steps) = s.simplify(sin0);
        assert!(steps.is_empty());
        assert_eq!(result, sin0);

        s.enable_rule("Evaluate Trigonometric Functions");
        assert!(s.is_zero(sin0));
    }

    #[test]
    fn test_steps_record_rewrites() {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let exp = s.context.call_builtin(BuiltinFn::Exp, vec![x]);
        let ln = s.context.call_builtin(BuiltinFn::Ln, vec![exp]);
        let (result, steps) = s.simplify(ln);
        assert_eq!(result, x);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].rule_name, "Exponential As Power");
        assert_eq!(steps[1].rule_name, "Evaluate Logarithms");
        assert_eq!(
            format!("{}", DisplayExpr { context: &s.context, id: result }),
            "x"
        );
    }

    #[test]
    fn test_equivalence_ignores_shape() {
        let mut s = Simplifier::with_default_rules();
        let x = s.context.var("x");
        let two = s.context.num(2);
        let a = s.context.add(Expr::Mul(two, x));
        let b = s.context.add(Expr::Add(x, x));
        assert!(s.are_equivalent(a, b));
    }
}
