// Topic modeling — backend trait and the built-in variational LDA.

pub mod math;
pub mod params;
pub mod traits;
pub mod vb;
