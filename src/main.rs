use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use covid_lda::config::Config;
use covid_lda::lda::traits::TopicDistribution;
use covid_lda::lda::vb::VariationalLda;
use covid_lda::output::terminal;
use covid_lda::scoring::{RelevanceScorer, TopicSelection};
use covid_lda::text::Preprocessor;

/// Example texts scored by `covid-lda demo`.
const DEMO_TEXTS: &[&str] = &[
    "Covid is so common, Everyone is positive with covid-19\n\
     The president is a patient and is contagious, the symptoms are bad\n\
     omicron is coming to the world they say. I have to get a test for my flight",
    "Leetcode is fun but I gotta say this it does suck up my time\n\
     I find myself avoiding coding for my cs final project by instead coding\n\
     useless algorithms on a site filled with questions about useless algorithms",
];

/// covid-lda: train an LDA topic model and score text for COVID-relatedness.
#[derive(Parser)]
#[command(name = "covid-lda", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a topic model and save corpus, dictionary and model
    Train {
        /// Training file, one document per line
        #[arg(long)]
        data: Option<PathBuf>,

        /// Directory to write the artifacts into (created if missing)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of topics (default: 10)
        #[arg(long)]
        topics: Option<usize>,

        /// Passes over the corpus (default: 15)
        #[arg(long)]
        passes: Option<usize>,

        /// RNG seed for reproducible training
        #[arg(long)]
        seed: Option<u64>,

        /// Terms whose best topic is designated as a target (default: covid)
        #[arg(long, value_delimiter = ',')]
        seed_terms: Option<Vec<String>>,
    },

    /// Score text for relevance to the target topics
    Score {
        /// The text to score
        text: String,

        /// Model directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Topic ids to sum, e.g. 3,7 (overrides the model's target topics)
        #[arg(long, value_delimiter = ',', conflicts_with = "last")]
        target_topics: Option<Vec<usize>>,

        /// Sum the last N listed topics instead of target topics
        #[arg(long)]
        last: Option<usize>,
    },

    /// Show the trained topics and their top terms
    Topics {
        /// Model directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Terms shown per topic (default: 20)
        #[arg(long, default_value = "20")]
        words: usize,
    },

    /// Score the two built-in example texts
    Demo {
        /// Model directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("covid_lda=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            out,
            topics,
            passes,
            seed,
            seed_terms,
        } => {
            let mut config = Config::load()?;
            if let Some(data) = data {
                config.training_data = data;
            }
            if let Some(out) = out {
                config.model_dir = out;
            }
            config.num_topics = topics.or(config.num_topics);
            config.passes = passes.or(config.passes);
            config.seed = seed.or(config.seed);
            config.seed_terms = seed_terms.or(config.seed_terms);

            std::fs::create_dir_all(&config.model_dir).with_context(|| {
                format!(
                    "Failed to create model directory: {}",
                    config.model_dir.display()
                )
            })?;

            let params = config.training_params();
            let preprocessor = Preprocessor::from_options(&config.preprocess_options())?;

            println!(
                "Training {} topics over {} passes from {}...",
                params.num_topics,
                params.passes,
                config.training_data.display()
            );

            covid_lda::training::train(
                Some(&config.training_data),
                &config.model_dir,
                &params,
                &preprocessor,
                &VariationalLda::with_progress(),
            )?;

            println!(
                "{}",
                format!("Model saved to {}", config.model_dir.display()).bold()
            );
            println!("Review the topics above. Target topics are marked; override them with --target-topics when scoring.");
        }

        Commands::Score {
            text,
            dir,
            target_topics,
            last,
        } => {
            let mut config = Config::load()?;
            if let Some(dir) = dir {
                config.model_dir = dir;
            }
            config.require_model()?;

            let scorer = load_scorer(&config, target_topics.or(config.target_topics.clone()))?;
            let scorer = match last {
                Some(n) => scorer.with_selection(TopicSelection::LastListed(n)),
                None => scorer,
            };

            let breakdown = scorer.explain(&text);
            terminal::display_score(&text, &breakdown, scorer.selection());
        }

        Commands::Topics { dir, words } => {
            let mut config = Config::load()?;
            if let Some(dir) = dir {
                config.model_dir = dir;
            }
            config.require_model()?;

            let scorer = load_scorer(&config, config.target_topics.clone())?;
            terminal::display_model_summary(scorer.model(), scorer.dictionary(), scorer.selection());
            terminal::display_topics(
                &scorer.model().print_topics(scorer.dictionary(), words),
                scorer.model().target_topics(),
            );
        }

        Commands::Demo { dir } => {
            let mut config = Config::load()?;
            if let Some(dir) = dir {
                config.model_dir = dir;
            }
            config.require_model()?;

            let scorer = load_scorer(&config, config.target_topics.clone())?;
            terminal::display_model_summary(scorer.model(), scorer.dictionary(), scorer.selection());

            for text in DEMO_TEXTS {
                let breakdown = scorer.explain(text);
                terminal::display_score(text, &breakdown, scorer.selection());
            }
        }
    }

    Ok(())
}

/// Load the scorer from the configured model directory.
fn load_scorer(config: &Config, target_topics: Option<Vec<usize>>) -> Result<RelevanceScorer> {
    let preprocessor = Preprocessor::from_options(&config.preprocess_options())?;
    let scorer = RelevanceScorer::load(&config.model_dir, preprocessor, target_topics)?;
    info!(
        dir = %config.model_dir.display(),
        topics = scorer.model().num_topics(),
        selection = ?scorer.selection(),
        "Loaded scorer"
    );
    Ok(scorer)
}
