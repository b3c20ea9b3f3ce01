// Latent Dirichlet Allocation fitted with online variational Bayes.
//
// Each pass runs the E-step over the whole corpus (per-document variational
// gamma, iterated until the mean change drops below `gamma_threshold`), then
// blends the resulting topic-term sufficient statistics into the model with
// step size rho = (OFFSET + pass + updates)^-DECAY.
//
// The topic-term variational parameter is lambda = eta + sstats. Scoring only
// needs exp(E[log beta]) which is cached and rebuilt whenever sstats change
// or the model is loaded from disk.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Gamma};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::math::{exp_dirichlet_expectation, mean_abs_diff};
use super::params::TrainingParams;
use super::traits::{TopicDistribution, TopicModelBackend};
use crate::corpus::bow::BowVector;
use crate::corpus::dictionary::Dictionary;

/// Learning-rate offset (downweights early passes).
const OFFSET: f64 = 1.0;

/// Learning-rate decay exponent, in (0.5, 1] for convergence.
const DECAY: f64 = 0.5;

/// Shape of the Gamma used to initialize sstats and training gammas.
/// Scale is its inverse, so draws center on 1.0.
const INIT_GAMMA_SHAPE: f64 = 100.0;

/// Guards the per-token normalizer against division by zero.
const PHI_EPSILON: f64 = 1e-100;

/// Variational LDA backend.
#[derive(Debug, Clone, Default)]
pub struct VariationalLda {
    /// Draw a progress bar over passes (off for library and test use)
    pub show_progress: bool,
}

impl VariationalLda {
    pub fn with_progress() -> Self {
        Self {
            show_progress: true,
        }
    }
}

/// Everything persisted for a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LdaState {
    num_topics: usize,
    num_terms: usize,
    alpha: Vec<f64>,
    eta: f64,
    passes: usize,
    iterations: usize,
    gamma_threshold: f64,
    minimum_probability: f64,
    seed: u64,
    /// Topics designated as the scoring target when training finished
    target_topics: Vec<usize>,
    trained_at: DateTime<Utc>,
    /// Topic-term sufficient statistics, num_topics x num_terms
    sstats: Vec<Vec<f64>>,
}

/// A trained LDA topic model. Immutable once training finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "LdaState")]
pub struct LdaModel {
    #[serde(flatten)]
    state: LdaState,
    #[serde(skip)]
    exp_elog_beta: Vec<Vec<f64>>,
}

impl From<LdaState> for LdaModel {
    fn from(state: LdaState) -> Self {
        let mut model = Self {
            state,
            exp_elog_beta: Vec::new(),
        };
        model.refresh_beta();
        model
    }
}

impl TopicModelBackend for VariationalLda {
    type Model = LdaModel;

    fn fit(
        &self,
        corpus: &[BowVector],
        dictionary: &Dictionary,
        params: &TrainingParams,
    ) -> Result<LdaModel> {
        if params.num_topics == 0 {
            anyhow::bail!("Topic count must be at least 1");
        }
        if corpus.is_empty() {
            anyhow::bail!("Cannot train a topic model on an empty corpus");
        }
        if dictionary.is_empty() {
            anyhow::bail!(
                "Dictionary is empty — every training document was filtered down to nothing"
            );
        }

        let num_terms = dictionary.len();
        if let Some(bad) = corpus
            .iter()
            .flatten()
            .find(|&&(id, _)| id as usize >= num_terms)
        {
            anyhow::bail!(
                "Corpus references term id {} but the dictionary has only {} terms",
                bad.0,
                num_terms
            );
        }

        let seed = params.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let init = Gamma::new(INIT_GAMMA_SHAPE, 1.0 / INIT_GAMMA_SHAPE)
            .map_err(|e| anyhow::anyhow!("Invalid initialization distribution: {}", e))?;

        let k = params.num_topics;
        let sstats: Vec<Vec<f64>> = (0..k)
            .map(|_| (0..num_terms).map(|_| init.sample(&mut rng)).collect())
            .collect();

        let mut model = LdaModel::from(LdaState {
            num_topics: k,
            num_terms,
            alpha: vec![params.alpha(); k],
            eta: params.eta(),
            passes: params.passes,
            iterations: params.iterations,
            gamma_threshold: params.gamma_threshold,
            minimum_probability: params.minimum_probability,
            seed,
            target_topics: Vec::new(),
            trained_at: Utc::now(),
            sstats,
        });

        info!(
            docs = corpus.len(),
            terms = num_terms,
            topics = k,
            passes = params.passes,
            seed,
            "Training LDA model"
        );

        let pb = if self.show_progress {
            let pb = ProgressBar::new(params.passes as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  [{bar:40.cyan/blue}] pass {pos}/{len} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            Some(pb)
        } else {
            None
        };

        // The whole corpus is one chunk, so each pass is exactly one update
        let mut updates = 0usize;
        for pass in 0..params.passes {
            let (pass_sstats, converged) = model.e_step(corpus, &init, &mut rng);
            let rho = (OFFSET + pass as f64 + updates as f64).powf(-DECAY);
            model.m_step(rho, pass_sstats);
            updates += 1;

            debug!(
                pass,
                rho,
                converged,
                docs = corpus.len(),
                "Finished LDA pass"
            );
            if let Some(ref pb) = pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        model.state.trained_at = Utc::now();
        Ok(model)
    }
}

impl LdaModel {
    pub fn num_terms(&self) -> usize {
        self.state.num_terms
    }

    pub fn passes(&self) -> usize {
        self.state.passes
    }

    pub fn seed(&self) -> u64 {
        self.state.seed
    }

    pub fn alpha(&self) -> &[f64] {
        &self.state.alpha
    }

    pub fn eta(&self) -> f64 {
        self.state.eta
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.state.trained_at
    }

    pub fn minimum_probability(&self) -> f64 {
        self.state.minimum_probability
    }

    /// Topics designated as the scoring target at training time.
    pub fn target_topics(&self) -> &[usize] {
        &self.state.target_topics
    }

    pub fn set_target_topics(&mut self, topics: Vec<usize>) {
        self.state.target_topics = topics;
    }

    /// Normalized topic-term probabilities for one topic, indexed by term id.
    pub fn topic_terms(&self, topic: usize) -> Option<Vec<f64>> {
        let row = self.state.sstats.get(topic)?;
        let eta = self.state.eta;
        let total: f64 = row.iter().map(|s| s + eta).sum();
        Some(row.iter().map(|s| (s + eta) / total).collect())
    }

    /// The `topn` highest-probability (term id, probability) pairs of a topic.
    pub fn show_topic(&self, topic: usize, topn: usize) -> Vec<(u32, f64)> {
        let Some(probs) = self.topic_terms(topic) else {
            return Vec::new();
        };
        let mut ranked: Vec<(u32, f64)> = probs
            .into_iter()
            .enumerate()
            .map(|(id, p)| (id as u32, p))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(topn);
        ranked
    }

    /// Every topic rendered as `0.120*"covid" + 0.081*"virus" + ...`.
    pub fn print_topics(&self, dictionary: &Dictionary, num_words: usize) -> Vec<(usize, String)> {
        (0..self.state.num_topics)
            .map(|topic| {
                let rendered: Vec<String> = self
                    .show_topic(topic, num_words)
                    .into_iter()
                    .map(|(id, p)| format!("{:.3}*\"{}\"", p, dictionary.term(id).unwrap_or("?")))
                    .collect();
                (topic, rendered.join(" + "))
            })
            .collect()
    }

    /// For each term, the topic in which it is most probable.
    /// Unknown terms are skipped; the result is sorted and deduplicated.
    pub fn topics_for_terms<S: AsRef<str>>(&self, dictionary: &Dictionary, terms: &[S]) -> Vec<usize> {
        let mut topics: Vec<usize> = terms
            .iter()
            .filter_map(|term| dictionary.token_id(&term.as_ref().to_lowercase()))
            .filter_map(|id| {
                (0..self.state.num_topics)
                    .filter_map(|k| self.topic_terms(k).map(|p| (k, p[id as usize])))
                    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(k, _)| k)
            })
            .collect();
        topics.sort_unstable();
        topics.dedup();
        topics
    }

    /// Full (dense) topic proportions for a document, summing to 1.
    pub fn document_topic_proportions(&self, bow: &[(u32, u32)]) -> Vec<f64> {
        let init = vec![1.0; self.state.num_topics];
        let gamma = self.infer_document(bow, init, None);
        let total: f64 = gamma.iter().sum();
        gamma.into_iter().map(|g| g / total).collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize topic model")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write topic model to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read topic model from {}", path.display()))?;
        let model: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt topic model file {}", path.display()))?;

        let state = &model.state;
        if state.sstats.len() != state.num_topics
            || state.alpha.len() != state.num_topics
            || state.sstats.iter().any(|row| row.len() != state.num_terms)
        {
            anyhow::bail!(
                "Topic model {} is inconsistent with its declared shape ({} topics x {} terms)",
                path.display(),
                state.num_topics,
                state.num_terms
            );
        }
        Ok(model)
    }

    /// Rebuild exp(E[log beta]) from lambda = eta + sstats.
    fn refresh_beta(&mut self) {
        let eta = self.state.eta;
        self.exp_elog_beta = self
            .state
            .sstats
            .iter()
            .map(|row| {
                let lambda: Vec<f64> = row.iter().map(|s| s + eta).collect();
                exp_dirichlet_expectation(&lambda)
            })
            .collect();
    }

    /// One E-step over the corpus. Returns the expected topic-term counts and
    /// how many documents converged before hitting the iteration cap.
    fn e_step(
        &self,
        corpus: &[BowVector],
        init: &Gamma<f64>,
        rng: &mut StdRng,
    ) -> (Vec<Vec<f64>>, usize) {
        let k = self.state.num_topics;
        let mut sstats = vec![vec![0.0; self.state.num_terms]; k];
        let mut converged = 0;

        for bow in corpus {
            let gamma_init: Vec<f64> = (0..k).map(|_| init.sample(&mut *rng)).collect();
            let (_, iters) = self.infer_with_stats(bow, gamma_init, Some(&mut sstats));
            if iters < self.state.iterations {
                converged += 1;
            }
        }

        // Complete the expectation: phi includes the exp(E[log beta]) factor
        for (row, beta_row) in sstats.iter_mut().zip(&self.exp_elog_beta) {
            for (s, b) in row.iter_mut().zip(beta_row) {
                *s *= b;
            }
        }

        (sstats, converged)
    }

    /// Blend new sufficient statistics into the model with step size rho.
    fn m_step(&mut self, rho: f64, pass_sstats: Vec<Vec<f64>>) {
        for (row, new_row) in self.state.sstats.iter_mut().zip(pass_sstats) {
            for (s, n) in row.iter_mut().zip(new_row) {
                *s = (1.0 - rho) * *s + rho * n;
            }
        }
        self.refresh_beta();
    }

    fn infer_document(
        &self,
        bow: &[(u32, u32)],
        gamma_init: Vec<f64>,
        sstats: Option<&mut Vec<Vec<f64>>>,
    ) -> Vec<f64> {
        self.infer_with_stats(bow, gamma_init, sstats).0
    }

    /// Variational inference of one document's gamma. When `sstats` is given,
    /// accumulates cts/phinorm * exp(E[log theta]) into it (the caller
    /// multiplies by exp(E[log beta]) afterwards).
    fn infer_with_stats(
        &self,
        bow: &[(u32, u32)],
        gamma_init: Vec<f64>,
        sstats: Option<&mut Vec<Vec<f64>>>,
    ) -> (Vec<f64>, usize) {
        let k = self.state.num_topics;
        let (ids, cts): (Vec<usize>, Vec<f64>) = bow
            .iter()
            .filter(|&&(id, _)| (id as usize) < self.state.num_terms)
            .map(|&(id, count)| (id as usize, count as f64))
            .unzip();

        let mut gamma = gamma_init;
        let mut exp_elog_theta = exp_dirichlet_expectation(&gamma);
        let mut phinorm = self.phinorm(&ids, &exp_elog_theta);
        let mut iters = 0;

        while iters < self.state.iterations {
            iters += 1;
            let last = gamma.clone();

            for topic in 0..k {
                let beta_row = &self.exp_elog_beta[topic];
                let dot: f64 = ids
                    .iter()
                    .zip(&cts)
                    .zip(&phinorm)
                    .map(|((&w, &c), &norm)| c / norm * beta_row[w])
                    .sum();
                gamma[topic] = self.state.alpha[topic] + exp_elog_theta[topic] * dot;
            }

            exp_elog_theta = exp_dirichlet_expectation(&gamma);
            phinorm = self.phinorm(&ids, &exp_elog_theta);

            if mean_abs_diff(&gamma, &last) < self.state.gamma_threshold {
                break;
            }
        }

        if let Some(sstats) = sstats {
            for (topic, row) in sstats.iter_mut().enumerate() {
                for ((&w, &c), &norm) in ids.iter().zip(&cts).zip(&phinorm) {
                    row[w] += exp_elog_theta[topic] * c / norm;
                }
            }
        }

        (gamma, iters)
    }

    /// Per-token normalizer: sum over topics of exp(E[log theta]) * exp(E[log beta]).
    fn phinorm(&self, ids: &[usize], exp_elog_theta: &[f64]) -> Vec<f64> {
        ids.iter()
            .map(|&w| {
                exp_elog_theta
                    .iter()
                    .zip(&self.exp_elog_beta)
                    .map(|(t, beta_row)| t * beta_row[w])
                    .sum::<f64>()
                    + PHI_EPSILON
            })
            .collect()
    }
}

impl TopicDistribution for LdaModel {
    fn num_topics(&self) -> usize {
        self.state.num_topics
    }

    fn topic_distribution(&self, bow: &[(u32, u32)]) -> Vec<(usize, f64)> {
        let min = self.state.minimum_probability;
        self.document_topic_proportions(bow)
            .into_iter()
            .enumerate()
            .filter(|&(_, p)| p >= min)
            .collect()
    }
}
