//! Run identifiers and filename hygiene.

use chrono::Local;
use rand::seq::SliceRandom;
use rand::Rng;

/// Adjective vocabulary for run identifiers.
pub const ADJECTIVES: &[&str] = &[
    "azure", "crimson", "golden", "silver", "emerald", "sapphire", "crystal",
    "cosmic", "stellar", "lunar", "solar", "astral", "celestial", "ethereal",
    "swift", "bold", "grand", "noble", "vital", "prime", "peak",
    "mystic", "arcane", "mythic", "fabled", "epic", "legendary",
    "quantum", "cyber", "digital", "sonic", "neural", "vector",
];

/// Noun vocabulary for run identifiers.
pub const NOUNS: &[&str] = &[
    "nebula", "quasar", "pulsar", "nova", "cosmos", "galaxy", "star",
    "phoenix", "dragon", "griffin", "titan", "atlas", "oracle",
    "vertex", "nexus", "prism", "helix", "spiral", "matrix",
    "aurora", "horizon", "zenith", "summit", "storm", "thunder",
    "cipher", "beacon", "pulse", "core", "node", "stream",
];

/// Compose the word portion of a run id from an explicit random source and
/// vocabularies: two distinct adjectives and a noun.
pub fn run_id_words<R: Rng + ?Sized>(rng: &mut R, adjectives: &[&str], nouns: &[&str]) -> String {
    let mut picked = adjectives.choose_multiple(rng, 2);
    let first = picked.next().copied().unwrap_or("swift");
    let second = picked.next().copied().unwrap_or("bold");
    let noun = nouns.choose(rng).copied().unwrap_or("stream");
    format!("{first}-{second}-{noun}")
}

/// Generate a unique run identifier: `adj1-adj2-noun-YYYYMMDD-HHMMSS`.
pub fn unique_run_id() -> String {
    let words = run_id_words(&mut rand::thread_rng(), ADJECTIVES, NOUNS);
    format!("{words}-{}", Local::now().format("%Y%m%d-%H%M%S"))
}

/// Replace filesystem-hostile characters so a speaker name is safe inside
/// a generated filename.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}
