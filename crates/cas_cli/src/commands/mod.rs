//! Subcommand handlers and the output they share.

pub mod fourier;
pub mod integrate;
pub mod simplify;

use anyhow::{Context as _, Result};
use cas_ast::{DisplayExpr, ExprId};
use cas_engine::{Simplifier, Step};

use crate::config::CliConfig;
use crate::json_types::{HarmonicJson, OutputJson, StepJson};

/// What a command computed, before it is printed.
#[derive(Debug, Default)]
pub struct Report {
    pub result: String,
    pub steps: Vec<StepJson>,
    pub harmonics: Vec<HarmonicJson>,
}

pub fn new_simplifier(config: &CliConfig) -> Simplifier {
    let mut simplifier = Simplifier::with_default_rules();
    simplifier.options = config.simplify_options();
    simplifier
}

pub fn parse_expr(simplifier: &mut Simplifier, input: &str) -> Result<ExprId> {
    cas_parser::parse(input, &mut simplifier.context)
        .with_context(|| format!("failed to parse '{input}'"))
}

pub fn show(simplifier: &Simplifier, id: ExprId) -> String {
    DisplayExpr {
        context: &simplifier.context,
        id,
    }
    .to_string()
}

pub fn step_json(step: &Step) -> StepJson {
    StepJson {
        rule: step.rule_name.clone(),
        description: step.description.clone(),
        after: step.after_str.clone().unwrap_or_default(),
    }
}

/// Print `outcome` as text or as a JSON envelope. A failed outcome is
/// printed in JSON mode and then returned as the error.
pub fn emit(command: &'static str, input: &str, json: bool, outcome: Result<Report>) -> Result<()> {
    match outcome {
        Ok(report) if json => {
            let out = OutputJson::success(
                command,
                input,
                report.result,
                report.steps,
                report.harmonics,
            );
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
        Ok(report) => {
            for (i, step) in report.steps.iter().enumerate() {
                println!("{}. {}  [{}]", i + 1, step.description, step.rule);
                println!("   -> {}", step.after);
            }
            for h in &report.harmonics {
                println!("A_{} = {}", h.index, h.cos_coeff);
                println!("B_{} = {}", h.index, h.sin_coeff);
            }
            println!("{}", report.result);
            Ok(())
        }
        Err(err) => {
            if json {
                let out = OutputJson::failure(command, input, format!("{err:#}"));
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Err(err)
        }
    }
}
