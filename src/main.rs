//! Command-line front end: run the built-in theorems or a JSON batch file and
//! report one verdict per theorem.
#![forbid(unsafe_code)]

use clap::{ArgAction, Parser, Subcommand};
use hornet::error::Result;
use hornet::semantics::{find_countermodel, goal_countermodel};
use hornet::{
    BatchExecutor, BatchSummary, ClassicalAxioms, LemmaError, RunnerBuilder, RunnerConfig,
    TheoremCase, TheoremSuite, VALIDATION_DOMAIN,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXIT_PROVED: u8 = 0;
const EXIT_INPUT_ERROR: u8 = 2;
const EXIT_ADMITTED: u8 = 3;
const EXIT_STUCK: u8 = 4;
const EXIT_UNSOUND: u8 = 5;

#[derive(Parser)]
#[command(
    name = "hornet",
    about = "A miniature proof kernel for classical propositional and first-order logic",
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    /// Stop any script after this many tactics.
    #[arg(long, global = true, value_name = "N")]
    max_steps: Option<usize>,

    /// Evaluate theorems on a thread pool.
    #[arg(long, global = true)]
    parallel: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Read runner settings from a JSON file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the built-in theorems
    Builtin,
    /// Run a JSON array of theorem cases
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List the classical axioms and check them on small models
    Axioms,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("hornet=debug"),
        _ => EnvFilter::new("hornet=trace"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(filter)
        .init();
}

fn runner_config(args: &Args) -> Result<RunnerConfig> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(limit) = args.max_steps {
        config.max_steps = Some(limit);
    }
    Ok(config)
}

fn print_report(cases: &[TheoremCase], summary: &BatchSummary) {
    println!("{}", summary.render_table());
    for (case, result) in cases.iter().zip(&summary.results) {
        let verdict = result.verdict();
        if verdict.is_stuck() {
            println!("\n{}: {verdict}", result.name);
            continue;
        }
        if !verdict.is_admitted() {
            continue;
        }
        println!("\n{}: {verdict}", result.name);
        match find_countermodel(&case.statement, VALIDATION_DOMAIN) {
            Ok(Some(model)) => println!("  statement fails when {model}"),
            Ok(None) => println!("  no countermodel up to {VALIDATION_DOMAIN} elements"),
            Err(err) => warn!(theorem = %case.name, %err, "countermodel search skipped"),
        }
        for deferred in verdict.deferred() {
            println!("  deferred at step {}:", deferred.step);
            println!("{}", deferred.goal);
            if let Ok(Some(model)) = goal_countermodel(&deferred.goal, VALIDATION_DOMAIN) {
                println!("  (unprovable: fails when {model})");
            }
        }
    }
    println!(
        "\nTotal: {}  proved: {}  admitted: {}  stuck: {}",
        summary.total(),
        summary.proved,
        summary.admitted,
        summary.stuck
    );
}

fn exit_code(summary: &BatchSummary) -> u8 {
    if summary.stuck > 0 {
        EXIT_STUCK
    } else if summary.admitted > 0 {
        EXIT_ADMITTED
    } else {
        EXIT_PROVED
    }
}

fn check_axioms(json: bool) -> Result<u8> {
    let axioms = ClassicalAxioms::standard();
    if json {
        let lemmas: Vec<_> = axioms.iter().collect();
        println!("{}", serde_json::to_string_pretty(&lemmas)?);
    } else {
        for lemma in axioms.iter() {
            println!("{:<28} {}", lemma.name, lemma.statement);
        }
    }
    let code = soundness_exit_code(axioms.validate())?;
    if code == EXIT_PROVED && !json {
        println!("\nall {} axioms hold on carriers up to {VALIDATION_DOMAIN}", axioms.len());
    }
    Ok(code)
}

/// A falsified lemma gets its own exit code; a search that could not run is
/// still an error.
fn soundness_exit_code(validation: std::result::Result<(), LemmaError>) -> Result<u8> {
    match validation {
        Ok(()) => Ok(EXIT_PROVED),
        Err(err @ LemmaError::Unsound { .. }) => {
            warn!(%err, "unsound lemma");
            eprintln!("unsound: {err}");
            Ok(EXIT_UNSOUND)
        }
        Err(err) => Err(err.into()),
    }
}

fn run(args: &Args) -> Result<u8> {
    let suite = match &args.command {
        Command::Builtin => TheoremSuite::builtin(),
        Command::Check { file } => TheoremSuite::load(file)?,
        Command::Axioms => return check_axioms(args.json),
    };
    let runner = RunnerBuilder::new().with_config(runner_config(args)?).build();
    let executor = BatchExecutor::new(runner);
    let summary = if args.parallel {
        executor.run_parallel(suite.cases())
    } else {
        executor.run(suite.cases())
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(suite.cases(), &summary);
    }
    Ok(exit_code(&summary))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hornet::{Lemma, LemmaLibrary, Proposition};

    #[test]
    fn builtin_suite_exits_as_admitted() {
        let summary = BatchExecutor::default().run(TheoremSuite::builtin().cases());
        assert_eq!(exit_code(&summary), EXIT_ADMITTED);
    }

    #[test]
    fn cli_arguments_parse() {
        let args = Args::parse_from(["hornet", "check", "cases.json", "--max-steps", "30", "-vv"]);
        assert_eq!(args.max_steps, Some(30));
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Command::Check { .. }));
        let config = runner_config(&args).expect("no config file");
        assert_eq!(config.max_steps, Some(30));
    }

    #[test]
    fn unsound_lemmas_have_their_own_exit_code() {
        assert_eq!(soundness_exit_code(ClassicalAxioms::standard().validate()).ok(), Some(EXIT_PROVED));
        let bogus = LemmaLibrary::from_lemmas([Lemma::new("bogus", Proposition::prop("A"))])
            .expect("closed statement");
        let code = soundness_exit_code(bogus.validate()).expect("search runs");
        assert_eq!(code, EXIT_UNSOUND);
        assert!(![EXIT_PROVED, EXIT_INPUT_ERROR, EXIT_ADMITTED, EXIT_STUCK].contains(&code));
    }
}
