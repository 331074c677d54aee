use serde::{Deserialize, Serialize};

/// Post-event damage assessment of a building footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DamageState {
    Damaged,
    PossiblyDamaged,
    Unaffected,
}

impl DamageState {
    pub const ALL: [DamageState; 3] = [DamageState::Damaged, DamageState::PossiblyDamaged, DamageState::Unaffected];

    /// Attribute value used in the damage-annotated building files.
    pub fn source_label(&self) -> &'static str {
        match self {
            DamageState::Damaged => "Damage",
            DamageState::PossiblyDamaged => "Possible damage",
            DamageState::Unaffected => "pas touché",
        }
    }

    pub fn from_source_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.source_label() == label)
    }

    pub fn color(&self) -> &'static str {
        match self {
            DamageState::Damaged => "#FF4444",
            DamageState::PossiblyDamaged => "#FFEB3B",
            DamageState::Unaffected => "#4CAF50",
        }
    }
}
