/*!
The `lomrf` binary: a thin driver over the library pipeline. Argument
parsing, file formats, and process exit conventions are kept minimal
here; this binary is a concrete instance of that boundary, not a full
reimplementation of the upstream LoMRF CLI.

Exit codes: 0 success, 1 user error, 10 missing required argument, >10
fatal runtime error.
*/

mod args;

use std::fs;
use std::process::ExitCode;

use lomrf::completion::{predicate_completion, PredicateCompletionMode};
use lomrf::config::Config;
use lomrf::evidence::WorldAssumption;
use lomrf::ground::{ground, GroundingConfig};
use lomrf::inference::{Inference, MaxMargin, MaxWalkSat, WeightLearner};
use lomrf::normalize::to_cnf;
use lomrf::parser::{parse_theory, Theory};
use lomrf::structures::{AtomSignature, Clause};

use args::{Args, ArgsError, Verb};

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match Args::parse(&raw) {
        Ok(args) => args,
        Err(ArgsError::MissingRequired(flag)) => {
            eprintln!("missing required argument: -{flag}");
            return ExitCode::from(10);
        }
        Err(e) => {
            eprintln!("bad arguments: {e:?}");
            return ExitCode::from(1);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
        Err(CliError::MissingArgument(flag)) => {
            eprintln!("missing required argument: -{flag}");
            ExitCode::from(10)
        }
        Err(CliError::Runtime(e)) => {
            log::error!(target: "lomrf::cli", "fatal: {e}");
            eprintln!("fatal: {e}");
            ExitCode::from(11)
        }
    }
}

enum CliError {
    Usage(String),
    MissingArgument(&'static str),
    Runtime(lomrf::LomrfError),
}

impl From<ArgsError> for CliError {
    fn from(e: ArgsError) -> Self {
        match e {
            ArgsError::MissingRequired(flag) => CliError::MissingArgument(flag),
            other => CliError::Usage(format!("{other:?}")),
        }
    }
}

impl From<lomrf::LomrfError> for CliError {
    fn from(e: lomrf::LomrfError) -> Self {
        CliError::Runtime(e)
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    match args.verb {
        Verb::Infer => infer(args),
        Verb::Compile => compile(args),
        Verb::WLearn => wlearn(args),
        Verb::SLearn | Verb::Supervision => Err(CliError::Usage(
            "structure learning (slearn/supervision, OSL/OSLa search) is out of scope for this engine".to_string(),
        )),
    }
}

fn read_file(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::Usage(format!("cannot read {path}: {e}")))
}

/// Loads a theory and evidence file, applying predicate completion and
/// CNF extraction, ready for grounding.
fn load(kb_path: &str, db_path: &str, cwa: &[String], owa: &[String], config: &Config) -> Result<(Theory, lomrf::evidence::Evidence, Vec<Clause>), CliError> {
    let theory = parse_theory(&read_file(kb_path)?)?;

    let default_assumption = if config.cwa_defaults { WorldAssumption::Closed } else { WorldAssumption::Open };
    let evidence_source = read_file(db_path)?;
    let mut builder = lomrf::evidence::EvidenceBuilder::new(&theory.identity, default_assumption);
    for signature in cwa.iter().filter_map(|s| AtomSignature::parse(s).ok()) {
        builder.set_assumption(signature, WorldAssumption::Closed);
    }
    for signature in owa.iter().filter_map(|s| AtomSignature::parse(s).ok()) {
        builder.set_assumption(signature, WorldAssumption::Open);
    }
    lomrf::parser::db::parse_db(&evidence_source, &theory.schemas, &theory.domains, &theory.identity, &mut builder)?;
    let evidence = builder.finalize();

    let completed = predicate_completion(&theory.definite_clauses, &theory.formulas, &theory.schemas, config.pcm);
    let clauses: Vec<Clause> = completed.iter().flat_map(|wf| to_cnf(wf, &theory.domains, &theory.schemas)).collect();

    Ok((theory, evidence, clauses))
}

fn infer(args: &Args) -> Result<(), CliError> {
    let kb = args.require("i")?;
    let db = args.require("e")?;
    let out = args.require("r")?;
    let cwa = args.list("cwa");
    let owa = args.list("owa");

    let config = Config::default();
    let (theory, evidence, clauses) = load(kb, db, &cwa, &owa, &config)?;

    let grounding_config = GroundingConfig {
        workers: config.grounder_workers.value,
        with_dependency_map: config.dependency_map,
    };
    let mut mrf = ground(&clauses, &theory.domains, &theory.identity, &evidence, &theory.schemas, &grounding_config)?;

    let query: Vec<AtomSignature> = args.list("q").iter().filter_map(|s| AtomSignature::parse(s).ok()).collect();
    let mut solver = MaxWalkSat::new(1, 0.5, 100_000);
    let outcome = solver.infer(&mut mrf, &query, None)?;
    log::info!(target: "lomrf::cli", "inference finished: {outcome:?}");

    let mut output = String::new();
    for signature in &query {
        if let Some(identity) = theory.identity.predicate(signature) {
            for id in identity.matches(&theory.domains, &[]) {
                if let Some((_, ground_args)) = theory.identity.decode(&theory.domains, id) {
                    let atom = mrf.atom(id).map(|a| a.truth).unwrap_or(lomrf::evidence::TriState::Unknown);
                    let prefix = if atom == lomrf::evidence::TriState::False { "!" } else { "" };
                    output.push_str(&format!("{prefix}{}({})\n", signature.symbol, ground_args.join(",")));
                }
            }
        }
    }
    fs::write(out, output).map_err(|e| CliError::Usage(format!("cannot write {out}: {e}")))
}

fn compile(args: &Args) -> Result<(), CliError> {
    let kb = args.require("i")?;
    let out = args.require("o")?;
    let pcm = match args.get("pcm") {
        Some("decomposed") => PredicateCompletionMode::Decomposed,
        Some("simplification") => PredicateCompletionMode::Simplification,
        _ => PredicateCompletionMode::Standard,
    };
    let strip_weights = matches!(args.get("w"), Some("remove_all"));

    let mut config = Config::default();
    config.pcm = pcm;

    let theory = parse_theory(&read_file(kb)?)?;
    let completed = predicate_completion(&theory.definite_clauses, &theory.formulas, &theory.schemas, config.pcm);

    let mut output = String::new();
    for wf in &completed {
        if args.get("cnf").is_some() {
            for clause in to_cnf(wf, &theory.domains, &theory.schemas) {
                if !strip_weights && clause.is_hard() {
                    output.push_str(&format!("{clause}\n"));
                } else if !strip_weights {
                    output.push_str(&format!("{} {clause}\n", clause.weight));
                } else {
                    output.push_str(&format!("{}\n", clause.to_string().trim_end_matches('.')));
                }
            }
        } else if !strip_weights {
            output.push_str(&format!("{} {}\n", wf.weight, wf.formula));
        } else {
            output.push_str(&format!("{}\n", wf.formula));
        }
    }

    fs::write(out, output).map_err(|e| CliError::Usage(format!("cannot write {out}: {e}")))
}

/// A single perceptron-style max-margin pass: for each
/// parent clause, nudge its weight toward the annotated grounding count
/// and away from the count under the current MAP assignment.
fn wlearn(args: &Args) -> Result<(), CliError> {
    let kb = args.require("i")?;
    let db = args.require("t")?;
    let out = args.require("o")?;
    let ne: Vec<String> = args.list("ne");

    let mut config = Config::default();
    config.dependency_map = true;
    let (theory, evidence, clauses) = load(kb, db, &[], &ne, &config)?;

    let grounding_config = GroundingConfig {
        workers: config.grounder_workers.value,
        with_dependency_map: true,
    };
    let mut mrf = ground(&clauses, &theory.domains, &theory.identity, &evidence, &theory.schemas, &grounding_config)?;
    let Some(dep) = mrf.dependency_map().cloned() else {
        return Err(CliError::Runtime(lomrf::LomrfError::Unsatisfiable));
    };

    let learner = MaxMargin { learning_rate: 0.1 };
    let annotated: lomrf::inference::Valuation = mrf.atoms().iter().map(|(&id, atom)| (id, atom.truth)).collect();
    let annotated_counts = learner.count_groundings(&mrf, &dep);

    let mut solver = MaxWalkSat::new(2, 0.5, 10_000);
    solver.infer(&mut mrf, &[], None).ok();
    let map_counts = learner.count_groundings(&mrf, &dep);

    let weights: Vec<f64> = annotated_counts
        .iter()
        .zip(map_counts.iter())
        .map(|(&a, &m)| learner.learning_rate * (a - m) as f64)
        .collect();

    let mut learner = learner;
    learner.update_weights(&mut mrf, &dep, &weights);
    log::info!(target: "lomrf::cli", "loss after one max-margin pass: {}", learner.loss(&mrf, &annotated));

    let mut output = String::new();
    for (parent, weight) in weights.iter().enumerate() {
        output.push_str(&format!("{weight} // clause {parent}\n"));
    }
    fs::write(out, output).map_err(|e| CliError::Usage(format!("cannot write {out}: {e}")))
}
