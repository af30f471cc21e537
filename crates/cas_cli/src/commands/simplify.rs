//! simplify subcommand handler.

use anyhow::Result;
use clap::Args;

use super::{emit, new_simplifier, parse_expr, show, step_json, Report};
use crate::config::CliConfig;

/// Arguments for simplify subcommand
#[derive(Args, Debug)]
pub struct SimplifyArgs {
    /// Expression to simplify
    pub expr: String,

    /// Show the rule rewrites that were applied
    #[arg(long)]
    pub steps: bool,

    /// Print a JSON envelope instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SimplifyArgs, config: &CliConfig) -> Result<()> {
    let json = args.json || config.json;
    let show_steps = args.steps || config.show_steps;
    let outcome = run_inner(&args.expr, show_steps, config);
    emit("simplify", &args.expr, json, outcome)
}

fn run_inner(input: &str, show_steps: bool, config: &CliConfig) -> Result<Report> {
    let mut simplifier = new_simplifier(config);
    simplifier.collect_steps = show_steps;
    let expr = parse_expr(&mut simplifier, input)?;
    let (result, steps) = simplifier.simplify(expr);
    Ok(Report {
        result: show(&simplifier, result),
        steps: steps.iter().map(step_json).collect(),
        harmonics: Vec::new(),
    })
}
