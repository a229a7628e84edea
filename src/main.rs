use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;

use conditional_validator::conditional::rules::{RulesFile, RulesLoader, ValidationPlan};
use conditional_validator::host::ConstraintCatalog;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a subject document against a rules file
    Check {
        /// Path to the rules file (falls back to VALIDATION_RULES)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Path to the subject JSON document
        #[arg(short, long)]
        subject: PathBuf,

        /// Validation group to run; repeatable
        #[arg(short, long = "group")]
        groups: Vec<String>,

        /// Print violations as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the available conditional constraint kinds
    Kinds,
    /// Print the JSON Schema of the rules file format
    Schema,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Check {
            rules,
            subject,
            groups,
            json,
        } => {
            let rules_path = match rules {
                Some(path) => path,
                None => std::env::var("VALIDATION_RULES")
                    .map(PathBuf::from)
                    .context("no --rules given and VALIDATION_RULES is not set")?,
            };
            log::info!("Using rules: {}", rules_path.display());

            let loader = RulesLoader::new();
            let rules = loader
                .load_rules(&rules_path)
                .with_context(|| format!("failed to load rules {}", rules_path.display()))?;
            let plan = ValidationPlan::from_rules(&rules)?;

            let doc = loader
                .load_subject(&subject)
                .with_context(|| format!("failed to load subject {}", subject.display()))?;
            let record = plan.subject_from(&doc)?;
            let violations = plan.validate(&record, &groups)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&violations)?);
            } else if violations.is_empty() {
                println!("{}: valid", doc.type_name);
            } else {
                for violation in &violations {
                    println!("{}", violation);
                }
            }

            if !violations.is_empty() {
                bail!("{} constraint violation(s)", violations.len());
            }
        }
        Commands::Kinds => {
            let catalog = ConstraintCatalog::with_builtins();
            for name in catalog.conditional_names() {
                let wraps = catalog
                    .conditional(name)
                    .and_then(|kind| kind.validate_as.clone())
                    .map(|kind| kind.name.clone())
                    .unwrap_or_default();
                println!("{:<16} -> {}", name, wraps);
            }
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(RulesFile);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}
