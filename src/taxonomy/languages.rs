//! Per-language heuristics used when estimating repository size and
//! complexity from GitHub's language byte counts.

/// Weight used for languages missing from [`COMPLEXITY_WEIGHTS`].
pub const DEFAULT_COMPLEXITY_WEIGHT: u32 = 3;

/// Bytes-per-line used for languages missing from [`BYTES_PER_LINE`].
pub const DEFAULT_BYTES_PER_LINE: u64 = 40;

/// Languages weighted by typical complexity and ecosystem depth, 1-10.
pub const COMPLEXITY_WEIGHTS: &[(&str, u32)] = &[
    ("Assembly", 10),
    ("C", 9),
    ("C++", 9),
    ("Rust", 9),
    ("Haskell", 9),
    ("Scala", 8),
    ("Go", 7),
    ("Java", 7),
    ("Kotlin", 7),
    ("Swift", 7),
    ("TypeScript", 6),
    ("Python", 6),
    ("Ruby", 5),
    ("JavaScript", 5),
    ("PHP", 4),
    ("Dart", 4),
    ("Lua", 4),
    ("Shell", 3),
    ("HTML", 2),
    ("CSS", 2),
    ("Dockerfile", 2),
];

/// Approximate average source line length in bytes.
pub const BYTES_PER_LINE: &[(&str, u64)] = &[
    ("Python", 35),
    ("JavaScript", 40),
    ("TypeScript", 42),
    ("Java", 50),
    ("C", 45),
    ("C++", 48),
    ("Go", 38),
    ("Rust", 42),
    ("Ruby", 32),
    ("PHP", 38),
    ("Swift", 40),
    ("Kotlin", 45),
    ("Scala", 48),
    ("HTML", 60),
    ("CSS", 30),
    ("Shell", 28),
];

fn lookup<T: Copy>(table: &[(&str, T)], language: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, value)| *value)
}

/// Names are matched exactly as GitHub reports them ("C++", not "cpp").
pub fn complexity_weight(language: &str) -> u32 {
    lookup(COMPLEXITY_WEIGHTS, language).unwrap_or(DEFAULT_COMPLEXITY_WEIGHT)
}

pub fn bytes_per_line(language: &str) -> u64 {
    lookup(BYTES_PER_LINE, language).unwrap_or(DEFAULT_BYTES_PER_LINE)
}
