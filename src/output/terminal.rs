// Colored terminal output for topic listings and relevance scores.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers and the training pipeline delegate here.

use colored::Colorize;

use super::{single_line, truncate_chars};
use crate::corpus::dictionary::Dictionary;
use crate::lda::traits::TopicDistribution;
use crate::lda::vb::LdaModel;
use crate::scoring::{ScoreBreakdown, TopicSelection};

/// Print every topic's weighted terms, marking the designated target topics.
pub fn display_topics(topics: &[(usize, String)], targets: &[usize]) {
    println!("\n{}", format!("=== Topics ({}) ===", topics.len()).bold());
    println!();

    for (topic, terms) in topics {
        let label = format!("Topic {topic}");
        if targets.contains(topic) {
            println!("  {} {}", label.bright_green().bold(), "(target)".green());
        } else {
            println!("  {}", label.bold());
        }
        println!("      {}", terms.dimmed());
        println!();
    }
}

/// Print a one-paragraph summary of a loaded model.
pub fn display_model_summary(model: &LdaModel, dictionary: &Dictionary, selection: &TopicSelection) {
    println!(
        "Model: {} topics, {} terms, {} passes (seed {}, trained {})",
        model.num_topics(),
        dictionary.len(),
        model.passes(),
        model.seed(),
        model.trained_at().format("%Y-%m-%d %H:%M UTC"),
    );
    println!("Scoring: {}", describe_selection(selection));
}

/// Print a score with the topic distribution that produced it.
pub fn display_score(text: &str, breakdown: &ScoreBreakdown, selection: &TopicSelection) {
    println!(
        "\n{} {}",
        "Text:".bold(),
        truncate_chars(&single_line(text), 100).dimmed()
    );

    if breakdown.bow.is_empty() {
        println!(
            "  {}",
            "No in-vocabulary terms — nothing for the model to score.".yellow()
        );
    } else {
        let topics: Vec<String> = breakdown
            .distribution
            .iter()
            .map(|(topic, weight)| {
                let entry = format!("{topic}:{weight:.3}");
                if selected(selection, *topic, breakdown) {
                    entry.bright_green().to_string()
                } else {
                    entry
                }
            })
            .collect();
        println!(
            "  Terms: {} of {} lemmas in vocabulary",
            breakdown.bow.len(),
            breakdown.document.len()
        );
        println!("  Topics: {}", topics.join("  "));
    }

    println!("  {} {}", "Score:".bold(), colorize_score(breakdown.score));
}

/// One-line description of how a score is computed.
pub fn describe_selection(selection: &TopicSelection) -> String {
    match selection {
        TopicSelection::Designated(topics) => {
            let ids: Vec<String> = topics.iter().map(|t| t.to_string()).collect();
            format!("sum of target topics [{}]", ids.join(", "))
        }
        TopicSelection::LastListed(n) => {
            format!("sum of the last {n} listed topics, whatever they are")
        }
    }
}

fn selected(selection: &TopicSelection, topic: usize, breakdown: &ScoreBreakdown) -> bool {
    match selection {
        TopicSelection::Designated(topics) => topics.contains(&topic),
        TopicSelection::LastListed(n) => {
            let start = breakdown.distribution.len().saturating_sub(*n);
            breakdown.distribution[start..].iter().any(|&(t, _)| t == topic)
        }
    }
}

fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:.4}");
    if score >= 0.5 {
        text.bright_red().bold()
    } else if score >= 0.2 {
        text.yellow()
    } else {
        text.normal()
    }
}
