use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Frequency labels offered by the scan confirmation form, in display order.
pub const FREQUENCY_OPTIONS: [&str; 4] =
    ["Once daily", "Twice daily", "Every 8 hours", "As needed"];

/// How often a medication is taken.
///
/// The four well-known labels get their own variants so the schedule can
/// reason about them; anything else a user types (or an old file contains)
/// is carried through verbatim as `Other` and never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    OnceDaily,
    TwiceDaily,
    EveryEightHours,
    AsNeeded,
    Other(String),
}

impl Frequency {
    pub fn as_str(&self) -> &str {
        match self {
            Self::OnceDaily => "Once daily",
            Self::TwiceDaily => "Twice daily",
            Self::EveryEightHours => "Every 8 hours",
            Self::AsNeeded => "As needed",
            Self::Other(label) => label,
        }
    }

    /// Parse a display label. Unknown labels become `Other`, so this
    /// never fails and round-trips any stored value.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Once daily" => Self::OnceDaily,
            "Twice daily" => Self::TwiceDaily,
            "Every 8 hours" => Self::EveryEightHours,
            "As needed" => Self::AsNeeded,
            other => Self::Other(other.to_string()),
        }
    }

    /// Every frequency except a plain once-daily gets an evening dose slot.
    pub fn has_evening_dose(&self) -> bool {
        !matches!(self, Self::OnceDaily)
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::OnceDaily
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// On the wire and on disk a frequency is just its display label.
impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// The two fixed dose slots a day is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseSlot {
    Morning,
    Evening,
}

impl DoseSlot {
    /// Clock label shown on the reminders page.
    pub fn time_label(&self) -> &'static str {
        match self {
            Self::Morning => "08:00 AM",
            Self::Evening => "08:00 PM",
        }
    }

    /// Suffix appended to the medication id to form the entry id.
    pub fn id_suffix(&self) -> &'static str {
        match self {
            Self::Morning => "am",
            Self::Evening => "pm",
        }
    }
}

// Serialized as its clock label; schedule entries are never read back.
impl Serialize for DoseSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.time_label())
    }
}
