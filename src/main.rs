use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use urlsub_cli::config::{Settings, discover_settings, parse_settings_file};
use urlsub_cli::rules::RuleSet;
use urlsub_cli::{LoadStatus, RewriteEngine};

#[derive(Parser)]
#[command(name = "urlsub")]
#[command(
	author,
	version,
	about = "Rewrite URLs with an ordered list of regex substitution rules"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Settings file (default: ./.urlsub.toml, then ~/.urlsub.toml)
	#[arg(long, global = true, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Rule file, overriding `rules-file` from the settings
	#[arg(long, global = true, value_name = "FILE")]
	rules: Option<PathBuf>,

	/// Read patterns as extended regular expressions
	#[arg(long, global = true, overrides_with = "basic")]
	extended: bool,

	/// Read patterns as POSIX basic regular expressions
	#[arg(long, global = true, overrides_with = "extended")]
	basic: bool,

	/// Match patterns case-sensitively
	#[arg(long, global = true, overrides_with = "ignore_case")]
	case_sensitive: bool,

	/// Match patterns case-insensitively
	#[arg(long, global = true, overrides_with = "case_sensitive")]
	ignore_case: bool,

	/// Largest rewritten output accepted, in bytes
	#[arg(long, global = true, value_name = "BYTES")]
	capacity: Option<usize>,

	/// Log more (-v for info, -vv for debug); RUST_LOG takes precedence
	#[arg(short, long, global = true, action = ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Rewrite each INPUT, or each line of stdin when none are given
	Rewrite {
		/// Strings to rewrite
		inputs: Vec<String>,
	},
	/// Rule file commands
	Rules {
		#[command(subcommand)]
		action: RulesAction,
	},
}

#[derive(Subcommand)]
enum RulesAction {
	/// List the rules in priority order
	Show,
	/// Check the rule file for errors without rewriting anything
	Validate,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_tracing(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	let settings = resolve_settings(&cli)?;

	match &cli.command {
		Commands::Rewrite { inputs } => handle_rewrite(&settings, inputs),
		Commands::Rules { action } => match action {
			RulesAction::Show => handle_rules_show(&settings),
			RulesAction::Validate => handle_rules_validate(&settings),
		},
	}
}

/// Settings file values, overridden by command-line flags.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
	let mut settings = match &cli.config {
		Some(path) => parse_settings_file(path)
			.with_context(|| format!("Failed to load settings from {}", path.display()))?,
		None => {
			let cwd = std::env::current_dir().context("Failed to get current directory")?;
			discover_settings(&cwd)
				.context("Failed to load settings")?
				.map(|loaded| loaded.settings)
				.unwrap_or_default()
		}
	};

	if let Some(ref rules) = cli.rules {
		settings.rules_file = Some(rules.clone());
	}
	if let Some(extended) = flag_pair(cli.extended, cli.basic) {
		settings.extended = extended;
	}
	if let Some(case_sensitive) = flag_pair(cli.case_sensitive, cli.ignore_case) {
		settings.case_sensitive = case_sensitive;
	}
	if let Some(capacity) = cli.capacity {
		settings.output_capacity = capacity;
	}
	settings.validate().context("Invalid settings")?;

	Ok(settings)
}

/// Resolve an `--x` / `--no-x` style pair; clap keeps only the last one given.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
	match (on, off) {
		(true, _) => Some(true),
		(_, true) => Some(false),
		_ => None,
	}
}

fn rules_path(settings: &Settings) -> Result<&Path> {
	settings.rules_file.as_deref().ok_or_else(|| {
		anyhow::anyhow!("No rule file configured; pass --rules or set rules-file in .urlsub.toml")
	})
}

fn handle_rewrite(settings: &Settings, inputs: &[String]) -> Result<ExitCode> {
	let path = rules_path(settings)?;
	let engine = RewriteEngine::new(path, settings.flags());

	let status = engine
		.load()
		.with_context(|| format!("Failed to load rule file {}", path.display()))?;
	if status == LoadStatus::MissingSource {
		warn!(path = %path.display(), "rule file not found, inputs pass through unchanged");
	}

	let capacity = settings.output_capacity;
	let stdout = io::stdout();
	let mut out = stdout.lock();

	if inputs.is_empty() {
		for line in io::stdin().lock().lines() {
			let line = line.context("Failed to read stdin")?;
			writeln!(out, "{}", engine.rewrite_or_original(&line, capacity))?;
		}
	} else {
		for input in inputs {
			writeln!(out, "{}", engine.rewrite_or_original(input, capacity))?;
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_rules_show(settings: &Settings) -> Result<ExitCode> {
	let path = rules_path(settings)?;
	let Some(rule_set) = RuleSet::from_file(path, settings.flags())
		.with_context(|| format!("Failed to load rule file {}", path.display()))?
	else {
		println!("Rule file not found: {}", path.display());
		return Ok(ExitCode::SUCCESS);
	};

	println!("# Source: {}", rule_set.source_name());
	println!(
		"# syntax: {}",
		if settings.extended { "extended" } else { "basic" }
	);
	println!("# case-sensitive: {}", settings.case_sensitive);
	println!("# rules: {}", rule_set.len());
	println!();

	for (i, rule) in rule_set.rules().iter().enumerate() {
		println!("  Rule {} (line {}):", i + 1, rule.line());
		println!("    pattern: {}", rule.pattern());
		println!("    template: {}", rule.template().text());
		println!();
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_rules_validate(settings: &Settings) -> Result<ExitCode> {
	let path = rules_path(settings)?;

	match RuleSet::from_file(path, settings.flags()) {
		Ok(Some(rule_set)) => {
			println!(
				"Rule file is valid: {} ({} rules)",
				path.display(),
				rule_set.len()
			);
			Ok(ExitCode::SUCCESS)
		}
		Ok(None) => {
			println!("Rule file not found: {} (rewriting disabled)", path.display());
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Rule file error: {:#}", anyhow::Error::from(e));
			Ok(ExitCode::FAILURE)
		}
	}
}
