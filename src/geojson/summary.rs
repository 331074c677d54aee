use serde::Serialize;
use serde_json::Value;

use super::{damage::DamageState, document::{footprint_area, GeoDocument}};
use crate::classes::SizeClasses;

/// Building counts per size class and per damage state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildingSummary {
    pub total: usize,
    /// (label, count) in class order.
    pub by_class: Vec<(String, usize)>,
    /// Features whose area is missing or below the first class.
    pub unclassified: usize,
    /// (state, count) in `DamageState::ALL` order; zero when the file carries no damage attribute.
    pub by_damage: Vec<(DamageState, usize)>,
    pub total_area: f64,
}

impl BuildingSummary {
    pub fn from_document(doc: &GeoDocument, classes: &SizeClasses, area_attr: &str, damage_attr: &str) -> Self {
        let mut by_class = vec![0usize; classes.len()];
        let mut by_damage = [0usize; DamageState::ALL.len()];
        let mut unclassified = 0;
        let mut total_area = 0.0;

        for feature in doc.features() {
            match footprint_area(feature, area_attr) {
                Some(area) => {
                    total_area += area;
                    match classes.classify(area) {
                        Some(i) => by_class[i] += 1,
                        None => unclassified += 1,
                    }
                }
                None => unclassified += 1,
            }

            let damage = feature["properties"].get(damage_attr)
                .and_then(Value::as_str)
                .and_then(DamageState::from_source_label);
            if let Some(state) = damage {
                if let Some(i) = DamageState::ALL.iter().position(|s| *s == state) { by_damage[i] += 1; }
            }
        }

        Self {
            total: doc.len(),
            by_class: classes.labels().map(str::to_string).zip(by_class).collect(),
            unclassified,
            by_damage: DamageState::ALL.into_iter().zip(by_damage).collect(),
            total_area,
        }
    }

    pub fn count_for(&self, label: &str) -> Option<usize> {
        self.by_class.iter().find(|(l, _)| l == label).map(|(_, n)| *n)
    }
}

/// Totals shown on the stats overlay, aggregated from commune boundary features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CommuneStats {
    pub communes: usize,
    pub population: u64,
    pub households: u64,
}

impl CommuneStats {
    pub fn from_document(doc: &GeoDocument) -> Self {
        doc.features().iter().fold(Self::default(), |acc, f| {
            let props = &f["properties"];
            Self {
                communes: acc.communes + 1,
                population: acc.population + count(&props["Population"]),
                households: acc.households + count(&props["Nb_Menages"]),
            }
        })
    }
}

fn count(v: &Value) -> u64 {
    v.as_u64().or_else(|| v.as_f64().filter(|x| *x >= 0.0).map(|x| x.round() as u64)).unwrap_or(0)
}
