// Corpus building — term dictionary and bag-of-words vectors.

pub mod bow;
pub mod dictionary;
