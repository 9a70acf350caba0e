use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::debug;

use danci_review::config::Config;
use danci_review::db::vocabulary::VocabularyError;
use danci_review::db::{JsonProgressStore, ProgressStore, TextFileVocabulary, VocabularySource};
use danci_review::logging;
use danci_review::services::admin::{self, AdminError};
use danci_review::services::delivery::DeliveryService;
use danci_review::services::interval::IntervalModel;
use danci_review::services::scheduler::{Scheduler, StudyQueue};
use danci_review::services::session::{ReviewSession, RunError, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "danci-review", bin_name = "danci-review", version)]
#[command(about = "Daily spaced-repetition review for a vocabulary list", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Day to schedule for (YYYY-MM-DD), defaults to today
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// New words to introduce per day
    #[arg(long, global = true, allow_hyphen_values = true)]
    new_words: Option<i64>,

    /// Stage at which a word graduates
    #[arg(long, global = true, allow_hyphen_values = true)]
    max_stages: Option<i64>,

    /// Seed for interval jitter
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Select, deliver and commit today's study queue (default)
    Run,
    /// Show today's study queue without delivering or saving
    Preview,
    /// Summarize learning progress
    Stats,
    /// Show the progress record of one word
    Show { word: String },
    /// Set a word's stage by hand (0 resets it)
    SetStage { word: String, stage: u32 },
    /// Forget all progress for a word
    Reset { word: String },
    /// Append a word to the vocabulary file
    Add { word: String },
    /// Remove duplicate lines from the vocabulary file
    Dedup,
}

#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::from_env()
        .and_then(|config| config.with_overrides(cli.new_words, cli.max_stages, cli.seed));
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = logging::init_tracing(&config.logging);
    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    debug!(%today, progress_file = %config.progress_file.display(), "starting");

    match execute(cli.command.unwrap_or(Commands::Run), &config, today) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands, config: &Config, today: NaiveDate) -> Result<(), CommandError> {
    let mut store = JsonProgressStore::new(&config.progress_file);
    let vocabulary = TextFileVocabulary::new(&config.vocab_file);
    let scheduler = Scheduler::new(config.scheduler);

    match command {
        Commands::Run => {
            let delivery = DeliveryService::from_config(config.delivery.clone());
            let intervals = IntervalModel::from_seed_option(config.seed);
            let mut session = ReviewSession::new(store, vocabulary, delivery, scheduler, intervals);
            match session.run(today)? {
                RunOutcome::NothingDue => println!("{today}: nothing to study"),
                RunOutcome::Completed(summary) => {
                    print_queue(&summary.queue);
                    println!("Committed {} words.", summary.updated.len());
                    if let Some(location) = summary.receipt.location {
                        println!("Delivered to {}", location.display());
                    }
                }
            }
        }
        Commands::Preview => {
            let delivery = DeliveryService::from_config(config.delivery.clone());
            let intervals = IntervalModel::without_jitter();
            let session = ReviewSession::new(store, vocabulary, delivery, scheduler, intervals);
            let queue = session.preview(today)?;
            if queue.is_empty() {
                println!("{today}: nothing to study");
            } else {
                print_queue(&queue);
            }
        }
        Commands::Stats => {
            let words = vocabulary.list()?;
            let stats =
                admin::compute_stats(&store.load(), &words, today, config.scheduler.max_stages);
            println!("Progress file:    {}", store.path().display());
            println!("Words tracked:    {}", stats.total_records);
            println!("Unlearned:        {}", stats.unlearned);
            println!(
                "Learned:          {} ({:.1}%)",
                stats.learned,
                stats.learned_ratio() * 100.0
            );
            println!("Graduated:        {}", stats.graduated);
            println!("Due today:        {}", stats.due_today);
            println!("Vocabulary size:  {}", stats.vocabulary_size);
            println!("Never presented:  {}", stats.never_presented);
            for (stage, count) in &stats.stage_distribution {
                println!("  stage {stage}: {count}");
            }
        }
        Commands::Show { word } => {
            let record = admin::inspect(&store, &word)?;
            let phase = scheduler.phase_of(&record);
            println!("{}  stage {} ({})", record.word, record.stage, phase.as_str());
            println!("  first seen:  {}", display_date(record.first_seen));
            println!("  last review: {}", display_date(record.last_review));
            println!("  next review: {}", display_date(record.next_review));
        }
        Commands::SetStage { word, stage } => {
            let mut intervals = IntervalModel::from_seed_option(config.seed);
            match admin::set_stage(&mut store, &word, stage, today, &mut intervals)? {
                Some(record) => println!(
                    "{} -> stage {}, next review {}",
                    record.word,
                    record.stage,
                    display_date(record.next_review)
                ),
                None => println!("{word} reset to new"),
            }
        }
        Commands::Reset { word } => {
            let removed = admin::reset_word(&mut store, &word)?;
            println!("{} reset (was stage {})", removed.word, removed.stage);
        }
        Commands::Add { word } => {
            if vocabulary.add_word(&word)? {
                println!("Added {} to {}", word.trim(), vocabulary.path().display());
            } else {
                println!("{} is already in the vocabulary", word.trim());
            }
        }
        Commands::Dedup => {
            let report = vocabulary.dedup_file()?;
            println!(
                "{} words, {} unique, {} duplicates removed",
                report.original,
                report.unique,
                report.duplicates.len()
            );
        }
    }

    Ok(())
}

fn print_queue(queue: &StudyQueue) {
    println!(
        "{} words ({} new, {} review)",
        queue.len(),
        queue.new_count(),
        queue.review_count()
    );
    for item in queue.items() {
        if item.is_new {
            println!("  + {}", item.word);
        } else {
            println!("  ~ {} (stage {})", item.word, item.stage);
        }
    }
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}
