use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Frequency;

/// Quantity assumed when a scanned label does not state a count.
pub const DEFAULT_QUANTITY: u32 = 30;

/// One active prescription as stored on disk and served to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    /// Pills remaining in the current supply (not a cart quantity).
    pub quantity: u32,
    pub frequency: Frequency,
    pub refills: u32,
}

impl MedicationRecord {
    /// Promote a confirmed scan candidate to a stored record.
    ///
    /// The record always gets a fresh id and starts with zero refills;
    /// neither is something the form lets the user claim.
    pub fn from_candidate(candidate: CandidateRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: candidate.name.trim().to_string(),
            dosage: candidate.dosage.trim().to_string(),
            quantity: candidate.quantity,
            frequency: candidate.frequency,
            refills: 0,
        }
    }
}

/// Editable draft shown on the scan confirmation form.
///
/// Every field is optional on the wire; missing ones fall back to the
/// same defaults the field extractor uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    pub name: String,
    pub dosage: String,
    pub quantity: u32,
    pub frequency: Frequency,
}

impl Default for CandidateRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            dosage: String::new(),
            quantity: DEFAULT_QUANTITY,
            frequency: Frequency::OnceDaily,
        }
    }
}
