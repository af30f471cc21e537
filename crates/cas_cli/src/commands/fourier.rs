//! fourier subcommand handler.

use anyhow::Result;
use clap::Args;

use cas_series::{expand_symbolic, fourier_terms};

use super::{emit, new_simplifier, parse_expr, show, Report};
use crate::config::CliConfig;
use crate::json_types::HarmonicJson;

/// Arguments for fourier subcommand
#[derive(Args, Debug)]
pub struct FourierArgs {
    /// Expression to expand
    pub expr: String,

    /// Expansion variable [default: from config, else x]
    #[arg(long)]
    pub var: Option<String>,

    /// Lower bound of the interval
    #[arg(long, allow_hyphen_values = true)]
    pub from: String,

    /// Upper bound of the interval
    #[arg(long, allow_hyphen_values = true)]
    pub to: String,

    /// Number of cosine/sine harmonic pairs [default: from config, else 3]
    #[arg(long, conflicts_with = "symbolic")]
    pub terms: Option<u32>,

    /// Emit the infinite series with a symbolic summation index
    #[arg(long)]
    pub symbolic: bool,

    /// Also print the coefficients of each harmonic
    #[arg(long, conflicts_with = "symbolic")]
    pub coefficients: bool,

    /// Print a JSON envelope instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: FourierArgs, config: &CliConfig) -> Result<()> {
    let json = args.json || config.json;
    let outcome = run_inner(&args, config);
    emit("fourier", &args.expr, json, outcome)
}

fn run_inner(args: &FourierArgs, config: &CliConfig) -> Result<Report> {
    let mut simplifier = new_simplifier(config);
    let f = parse_expr(&mut simplifier, &args.expr)?;
    let lo = parse_expr(&mut simplifier, &args.from)?;
    let hi = parse_expr(&mut simplifier, &args.to)?;
    let name = args.var.as_deref().unwrap_or(&config.variable);
    let x = simplifier.context.var(name);

    if args.symbolic {
        let result = expand_symbolic(&mut simplifier, f, x, lo, hi)?;
        return Ok(Report {
            result: show(&simplifier, result),
            ..Default::default()
        });
    }

    let n = args.terms.unwrap_or(config.terms);
    let series = fourier_terms(&mut simplifier, f, x, n, lo, hi)?;
    let harmonics = if args.coefficients {
        series
            .harmonics
            .iter()
            .map(|h| HarmonicJson {
                index: h.index,
                cos_coeff: show(&simplifier, h.cos_coeff),
                sin_coeff: show(&simplifier, h.sin_coeff),
            })
            .collect()
    } else {
        Vec::new()
    };
    let result = series.to_expr(&mut simplifier);
    Ok(Report {
        result: show(&simplifier, result),
        steps: Vec::new(),
        harmonics,
    })
}
