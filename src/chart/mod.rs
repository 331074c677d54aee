mod tables;

use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// A statistical series selectable for charting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[default]
    PovertyRate,
    WallMaterials,
    RoofMaterials,
    HouseholdTypes,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::PovertyRate, Metric::WallMaterials, Metric::RoofMaterials, Metric::HouseholdTypes];

    /// Label shown in the metric picker.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::PovertyRate => "Taux de pauvreté",
            Metric::WallMaterials => "Matériaux de mur",
            Metric::RoofMaterials => "Matériaux de toit",
            Metric::HouseholdTypes => "Ménages par type",
        }
    }

    pub fn from_label(label: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.label() == label)
    }

    fn table(&self) -> &'static [(&'static str, f64)] {
        match self {
            Metric::PovertyRate => tables::POVERTY_RATES,
            Metric::WallMaterials => tables::WALL_MATERIALS,
            Metric::RoofMaterials => tables::ROOF_MATERIALS,
            Metric::HouseholdTypes => tables::HOUSEHOLD_TYPES,
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    /// Accepts either the kebab-case name or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poverty-rate" | "poverty" => Ok(Metric::PovertyRate),
            "wall-materials" | "walls" => Ok(Metric::WallMaterials),
            "roof-materials" | "roofs" => Ok(Metric::RoofMaterials),
            "household-types" | "households" => Ok(Metric::HouseholdTypes),
            _ => Metric::from_label(s).ok_or_else(|| anyhow!("Unknown metric {s:?}")),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecord {
    pub name: String,
    pub value: f64,
}

impl ChartRecord {
    pub fn new(name: impl Into<String>, value: f64) -> Self { Self { name: name.into(), value } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    BarWithReferenceLines,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
}

/// Records for `metric`. Poverty rates are sorted descending; other tables keep declaration order.
pub fn chart_records(metric: Metric) -> Vec<ChartRecord> {
    let records = metric.table().iter().map(|&(name, value)| ChartRecord::new(name, value)).collect();
    match metric {
        Metric::PovertyRate => sort_descending(records),
        _ => records,
    }
}

/// Like `chart_records`, keyed by display label. Unknown labels yield nothing.
pub fn chart_records_for_label(label: &str) -> Vec<ChartRecord> {
    Metric::from_label(label).map(chart_records).unwrap_or_default()
}

/// Stable descending sort by value; ties keep their input order.
pub fn sort_descending(mut records: Vec<ChartRecord>) -> Vec<ChartRecord> {
    records.sort_by(|a, b| b.value.total_cmp(&a.value));
    records
}

pub fn chart_kind(metric: Metric) -> ChartKind {
    match metric {
        Metric::PovertyRate => ChartKind::BarWithReferenceLines,
        _ => ChartKind::Pie,
    }
}

/// Benchmarks drawn over the poverty bar chart.
pub fn reference_lines() -> [ReferenceLine; 3] {
    [
        ReferenceLine { label: "Al Haouz", value: 5.5, color: "#2196F3" },
        ReferenceLine { label: "Zone sinistrée", value: 8.0, color: "#FF5252" },
        ReferenceLine { label: "Maroc", value: 4.8, color: "#4CAF50" },
    ]
}

/// Color of the `index`-th pie slice.
pub fn slice_color(index: usize) -> &'static str { tables::PALETTE[index % tables::PALETTE.len()] }
