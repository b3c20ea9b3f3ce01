// covid-lda: LDA topic modeling and COVID-relatedness scoring
//
// This is the library root. Data flows one way through the modules:
// text -> corpus -> lda -> store, with training and scoring at either end.

pub mod config;
pub mod corpus;
pub mod lda;
pub mod output;
pub mod scoring;
pub mod store;
pub mod text;
pub mod training;

pub use corpus::dictionary::Dictionary;
pub use lda::vb::LdaModel;
pub use scoring::{predict_label, RelevanceScorer, TopicSelection};
pub use store::load_model;
pub use training::train;
