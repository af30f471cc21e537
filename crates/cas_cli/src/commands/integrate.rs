//! integrate subcommand handler.

use anyhow::Result;
use clap::Args;

use cas_engine::{integrate, integrate_definite};

use super::{emit, new_simplifier, parse_expr, show, Report};
use crate::config::CliConfig;

/// Arguments for integrate subcommand
#[derive(Args, Debug)]
pub struct IntegrateArgs {
    /// Integrand
    pub expr: String,

    /// Integration variable [default: from config, else x]
    #[arg(long)]
    pub var: Option<String>,

    /// Lower bound; requires --to
    #[arg(long, allow_hyphen_values = true, requires = "to")]
    pub from: Option<String>,

    /// Upper bound; requires --from
    #[arg(long, allow_hyphen_values = true, requires = "from")]
    pub to: Option<String>,

    /// Print a JSON envelope instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: IntegrateArgs, config: &CliConfig) -> Result<()> {
    let json = args.json || config.json;
    let outcome = run_inner(&args, config);
    emit("integrate", &args.expr, json, outcome)
}

fn run_inner(args: &IntegrateArgs, config: &CliConfig) -> Result<Report> {
    let mut simplifier = new_simplifier(config);
    let f = parse_expr(&mut simplifier, &args.expr)?;
    let name = args.var.as_deref().unwrap_or(&config.variable);
    let x = simplifier.context.var(name);

    let result = match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let lo = parse_expr(&mut simplifier, from)?;
            let hi = parse_expr(&mut simplifier, to)?;
            integrate_definite(&mut simplifier, f, x, lo, hi)?
        }
        _ => integrate(&mut simplifier, f, x)?,
    };
    Ok(Report {
        result: show(&simplifier, result),
        ..Default::default()
    })
}
