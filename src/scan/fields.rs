//! Pull structured medication fields out of a raw label transcript.
//!
//! Deliberately simple: a handful of regexes that favour the first
//! plausible match. Labels vary too much for anything cleverer to pay
//! off without a drug-name dictionary, and the user confirms every
//! field on the form before anything is saved.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{CandidateRecord, Frequency, DEFAULT_QUANTITY};

/// First run of capitalized words. On a typical label that is the drug
/// name; on instruction-first labels it can swallow a leading word like
/// "Take", which the confirmation form exists to fix.
static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]+(?:\s[A-Z][a-z]+)*)").unwrap());

/// Strength like "500mg" or "500 MG".
static RE_DOSAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+\s?mg)").unwrap());

/// Count like "14 tablets", "30 caps", "60 pills".
static RE_QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s?(?:tablet|cap|pill)").unwrap());

/// Extract a medication candidate from a transcript.
///
/// Fields that match nothing keep their defaults: empty name and dosage,
/// quantity 30, frequency once daily. Frequency is never guessed from
/// the text; dosing instructions are too free-form to parse reliably.
pub fn extract(text: &str) -> CandidateRecord {
    let name = RE_NAME
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let dosage = RE_DOSAGE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let quantity = RE_QUANTITY
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(DEFAULT_QUANTITY);

    CandidateRecord {
        name,
        dosage,
        quantity,
        frequency: Frequency::OnceDaily,
    }
}
