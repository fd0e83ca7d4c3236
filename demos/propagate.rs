use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use propeller_rs::propagate::DEFAULT_MAX_DEPTH;
use propeller_rs::{Deduplication, ErrVal, Expr, PropagationConfig, Propagator};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Formula, e.g. "sin(a + b) / a^2".
    #[arg(value_name = "FORMULA")]
    formula: String,

    /// Measured variable as `name=value+-error` (or `name=value±error`).
    #[arg(long = "var", value_name = "BINDING", value_parser = parse_binding)]
    vars: Vec<(String, ErrVal)>,

    /// Treat every leaf as an independent variable.
    #[clap(long)]
    no_dedup: bool,

    /// Deepest expression handed to the symbolic engine.
    #[clap(long, value_name = "INT", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log level (off, error, warn, info, debug, trace).
    #[clap(long, value_name = "LEVEL", default_value = "info")]
    log_level: simplelog::LevelFilter,

    /// Write the expression tree in DOT format to this file.
    #[clap(long, value_name = "FILE")]
    dot: Option<PathBuf>,
}

fn parse_binding(s: &str) -> Result<(String, ErrVal), String> {
    let (name, rest) = s.split_once('=').ok_or_else(|| format!("expected `name=value+-error`, got `{}`", s))?;
    let (value, error) = rest
        .split_once("+-")
        .or_else(|| rest.split_once('±'))
        .unwrap_or((rest, "0"));
    let value: f64 = value.trim().parse().map_err(|e| format!("bad value in `{}`: {}", s, e))?;
    let error: f64 = error.trim().parse().map_err(|e| format!("bad error in `{}`: {}", s, e))?;
    Ok((name.trim().to_string(), ErrVal::new(value, error)))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    info!("args = {:?}", args);

    let bindings: HashMap<String, ErrVal> = args.vars.iter().cloned().collect();
    let expr = Expr::parse(&args.formula, &bindings)?;
    info!(
        "expression of size {}, depth {}, {} measured leaves",
        expr.size(),
        expr.depth(),
        expr.measured_count()
    );
    println!("formula = {}", expr.to_symbolic_string());

    if let Some(path) = &args.dot {
        std::fs::write(path, expr.to_dot()?)?;
        info!("wrote {}", path.display());
    }

    let config = PropagationConfig {
        deduplication: if args.no_dedup {
            Deduplication::Disabled
        } else {
            Deduplication::ByValue
        },
        max_depth: args.max_depth,
    };
    let propagator = Propagator::with_config(config);

    for partial in propagator.partials(&expr)? {
        println!(
            "d/d{} = {} (value {}, members {:?}, contribution {})",
            partial.id,
            partial.derivative,
            partial.value,
            partial.members,
            partial.contribution()
        );
    }

    let value = expr.nominal()?;
    let error = propagator.propagate(&expr)?;
    println!("result = {}", ErrVal::new(value, error));
    println!("value = {}, error = {}", value, error);

    Ok(())
}
