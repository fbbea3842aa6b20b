pub mod languages;

pub use languages::{bytes_per_line, complexity_weight};
