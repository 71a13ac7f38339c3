//! Domain records shared across the store, schedule, cart and API layers.

pub mod enums;
pub mod medication;

pub use enums::{DoseSlot, Frequency, FREQUENCY_OPTIONS};
pub use medication::{CandidateRecord, MedicationRecord, DEFAULT_QUANTITY};
