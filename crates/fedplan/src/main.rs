//! fedplan: federal retirement scenario comparison and goal solving
//!
//! Four subcommands over a YAML plan file:
//! - `compare`: apply a transform chain and print both projections
//! - `optimize`: search one parameter for a goal
//! - `break-even`: year the transformed plan's cumulative income overtakes
//!   the base
//! - `recommend`: run every target against every goal and summarize

mod commands;
mod input;
mod logging;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fedplan_core::solver::{OptimizationGoal, OptimizationTarget};

#[derive(Parser, Debug)]
#[command(name = "fedplan")]
#[command(about = "Retirement income projection and goal solving for federal employees")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a transform chain to a plan and compare the projections
    Compare {
        /// Path to the plan YAML
        plan: PathBuf,

        /// Transform spec `name:key=value,...`; repeatable, applied in order
        #[arg(short, long = "transform", required = true)]
        transforms: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Search one parameter for a goal under constraints
    Optimize {
        plan: PathBuf,

        /// Participant whose parameters are searched
        #[arg(short, long)]
        participant: String,

        /// tsp_rate, retirement_date, ss_age, tsp_balance, or all
        #[arg(short, long, value_parser = commands::parse_target)]
        target: OptimizationTarget,

        /// match_income, maximize_income, maximize_longevity, or minimize_taxes
        #[arg(short, long, value_parser = commands::parse_goal)]
        goal: OptimizationGoal,

        /// Annual net income goal; required for match_income
        #[arg(long)]
        target_income: Option<f64>,

        #[arg(long, default_value_t = 50)]
        max_iterations: usize,

        /// Convergence tolerance in dollars of first-year income
        #[arg(long, default_value_t = 1000.0)]
        tolerance: f64,

        #[arg(long)]
        json: bool,
    },

    /// Find the year the transformed plan's cumulative net income overtakes
    /// the base plan's
    BreakEven {
        plan: PathBuf,

        #[arg(short, long = "transform", required = true)]
        transforms: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Run every optimization target against every goal and print
    /// recommendations
    Recommend {
        plan: PathBuf,

        #[arg(short, long)]
        participant: String,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    logging::init(&args.log_level)?;

    match args.command {
        Command::Compare {
            plan,
            transforms,
            json,
        } => commands::compare::run(&plan, &transforms, json),
        Command::Optimize {
            plan,
            participant,
            target,
            goal,
            target_income,
            max_iterations,
            tolerance,
            json,
        } => commands::optimize::run(
            &plan,
            &commands::optimize::OptimizeArgs {
                participant,
                target,
                goal,
                target_income,
                max_iterations,
                tolerance,
            },
            json,
        ),
        Command::BreakEven {
            plan,
            transforms,
            json,
        } => commands::break_even::run(&plan, &transforms, json),
        Command::Recommend {
            plan,
            participant,
            json,
        } => commands::recommend::run(&plan, &participant, json),
    }
}
