//! Query Runner - try case-insensitive rewriting on sample data
//!
//! # Usage
//!
//! ```bash
//! cargo run --package recast-playground --bin query-runner -- --help
//! cargo run --package recast-playground --bin query-runner -- filter --field city --value paris --case-insensitive
//! cargo run --package recast-playground --bin query-runner -- count --field city --other home_city
//! cargo run --package recast-playground --bin query-runner -- explain --field city --value paris
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use common_config::RecastConfig;
use common_error::{RecastError, RecastResult};
use recast_core::Record;
use recast_expr::{Expr, lit};
use recast_provider::{InterceptingProvider, Query};
use recast_rewrite::RewriteChain;

use recast_playground::{PEOPLE, create_people, print_divider, print_header, print_rows};

/// Query Runner CLI.
#[derive(Parser, Debug)]
#[command(name = "query-runner")]
#[command(about = "Run string equality queries against sample people data")]
#[command(version)]
struct Args {
    /// Configuration file (JSON, or TOML with a .toml extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List people matching a string equality
    Filter {
        #[command(flatten)]
        predicate: Predicate,

        /// Compare strings ignoring case
        #[arg(short = 'i', long, default_value_t = false)]
        case_insensitive: bool,
    },

    /// Count people matching a string equality, with and without rewriting
    Count {
        #[command(flatten)]
        predicate: Predicate,
    },

    /// Show the expression tree before and after rewriting
    Explain {
        #[command(flatten)]
        predicate: Predicate,
    },
}

/// `field == value` or `field == other`.
#[derive(ClapArgs, Debug)]
struct Predicate {
    /// Field to compare (name, city, home_city)
    #[arg(short, long, default_value = "city")]
    field: String,

    /// Constant to compare against
    #[arg(short, long, conflicts_with = "other")]
    value: Option<String>,

    /// Second field to compare against
    #[arg(short, long)]
    other: Option<String>,
}

impl Predicate {
    fn build(&self, item: Expr) -> RecastResult<Expr> {
        let left = item.clone().member(self.field.as_str())?;
        let right = match (&self.value, &self.other) {
            (Some(value), None) => lit(value.as_str()),
            (None, Some(other)) => item.member(other.as_str())?,
            _ => {
                return Err(RecastError::invalid_parameter(
                    "exactly one of --value or --other is required",
                ));
            }
        };
        Ok(left.eq(right))
    }

    fn describe(&self) -> String {
        match (&self.value, &self.other) {
            (Some(value), _) => format!("{} == {value:?}", self.field),
            (_, Some(other)) => format!("{} == {other}", self.field),
            _ => self.field.clone(),
        }
    }
}

fn main() -> RecastResult<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RecastConfig::from_file(path)?,
        None => RecastConfig::default(),
    };

    let provider = create_people(config.execution.clone())?;
    let people = provider.query::<Record>(PEOPLE)?;

    match args.command {
        Commands::Filter {
            predicate,
            case_insensitive,
        } => run_filter(&people, &predicate, case_insensitive)?,
        Commands::Count { predicate } => run_count(&people, &predicate, &config)?,
        Commands::Explain { predicate } => run_explain(&people, &predicate, &config)?,
    }

    Ok(())
}

fn run_filter(
    people: &Query<Record>,
    predicate: &Predicate,
    case_insensitive: bool,
) -> RecastResult<()> {
    let mode = if case_insensitive {
        "ignoring case"
    } else {
        "ordinal"
    };
    print_header(&format!("People where {} ({mode})", predicate.describe()));

    let source = if case_insensitive {
        people.case_insensitive()?
    } else {
        people.clone()
    };
    let rows = source.filter(|item| predicate.build(item))?.into_dyn().to_vec()?;
    print_rows(&rows);
    Ok(())
}

fn run_count(
    people: &Query<Record>,
    predicate: &Predicate,
    config: &RecastConfig,
) -> RecastResult<()> {
    print_header(&format!("Counting people where {}", predicate.describe()));

    let plain = people.count_where(|item| predicate.build(item))?;
    let intercepted = InterceptingProvider::from_config(people, &config.rewrite)?
        .count_where(|item| predicate.build(item))?;

    println!("Without interception: {plain}");
    println!("With interception:    {intercepted}");
    Ok(())
}

fn run_explain(
    people: &Query<Record>,
    predicate: &Predicate,
    config: &RecastConfig,
) -> RecastResult<()> {
    let query = people.filter(|item| predicate.build(item))?;

    print_header("Expression");
    print!("{}", query.explain());

    let chain = RewriteChain::from_config(&config.rewrite).with_trace(true);
    let rewritten = chain.rewrite(query.expression().clone())?;

    print_header("Rewritten expression");
    print!("{}", rewritten.expr.explain());

    print_divider();
    print!("{}", rewritten.format_trace());
    Ok(())
}
