//! Build today's dose checklist from the medication list.
//!
//! The schedule is derived, never stored: it is regenerated from scratch
//! whenever the medication list changes, which also clears any taken
//! checkmarks. Rebuilding is the whole consistency story, so there is no
//! partial-update path to get wrong.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{DoseSlot, MedicationRecord};

/// One checkable dose on the reminders page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    /// Medication id plus slot suffix, e.g. `<uuid>-am`. Stable across
    /// regenerations for the same medication, so the UI can address it.
    pub id: String,
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    #[serde(rename = "time")]
    pub slot: DoseSlot,
    pub taken: bool,
}

impl ScheduleEntry {
    fn new(med: &MedicationRecord, slot: DoseSlot) -> Self {
        Self {
            id: format!("{}-{}", med.id, slot.id_suffix()),
            medication_id: med.id,
            name: med.name.clone(),
            dosage: med.dosage.clone(),
            slot,
            taken: false,
        }
    }
}

/// Generate the full day's entries: a morning dose for every medication,
/// plus an evening dose for everything that is not plain once-daily.
///
/// Sorted by clock label. Both slots share the "08:00 " prefix, so the
/// lexical order "AM" before "PM" is also clock order; that stops being
/// true if slots at other hours are ever added.
pub fn generate(medications: &[MedicationRecord]) -> Vec<ScheduleEntry> {
    let mut entries = Vec::with_capacity(medications.len() * 2);

    for med in medications {
        entries.push(ScheduleEntry::new(med, DoseSlot::Morning));
        if med.frequency.has_evening_dose() {
            entries.push(ScheduleEntry::new(med, DoseSlot::Evening));
        }
    }

    entries.sort_by(|a, b| a.slot.time_label().cmp(b.slot.time_label()));
    entries
}

/// Flip the taken flag on one entry. Returns the updated entry, or
/// `None` when no entry has that id.
pub fn toggle<'a>(entries: &'a mut [ScheduleEntry], entry_id: &str) -> Option<&'a ScheduleEntry> {
    let entry = entries.iter_mut().find(|e| e.id == entry_id)?;
    entry.taken = !entry.taken;
    Some(entry)
}
