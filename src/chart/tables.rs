//! Constant reference tables, in declaration order.

/// Poverty rate (%) per commune.
pub(super) const POVERTY_RATES: &[(&str, f64)] = &[
    ("Ait Hkim-Ait Yzid", 20.0),
    ("Alt Faska", 15.8),
    ("Setti Fadma", 13.0),
    ("Tidili Mesfioua", 11.6),
    ("Iguerferouane", 11.0),
    ("Ourika", 10.7),
    ("Sidi Badhaj", 10.1),
    ("Tidili", 9.8),
    ("Tazart", 9.3),
    ("Ighil", 8.4),
    ("Lalla Takerkoust", 7.7),
    ("Touama", 7.3),
    ("Tamaguert", 6.5),
    ("Asni", 6.3),
    ("Amghras", 5.7),
    ("Ghmate", 4.7),
    ("Sidi Abdallah Ghiat", 4.1),
    ("Ouirgane", 3.7),
    ("Tazarine", 3.1),
    ("Ait Aadel", 2.8),
    ("Ait Sidi Daoud", 2.7),
    ("Sidi Rahhal", 2.5),
    ("Tamazouzte", 2.1),
    ("Talat N'Yaaqoub", 1.9),
    ("Ijoukak", 1.3),
    ("Ait Ourir", 1.1),
    ("Amizmiz", 0.9),
    ("Tahanaout", 0.5),
    ("Amezmiz", 0.4),
];

/// Wall material shares (%).
pub(super) const WALL_MATERIALS: &[(&str, f64)] = &[
    ("Béton armé/Briques", 36.6),
    ("Pierres scellées mortier", 4.6),
    ("Planches bois", 0.5),
    ("Pierres scellées terre", 16.6),
    ("Pisé/Briques terre", 41.5),
    ("Bois récupéré", 0.2),
];

/// Roof material shares (%).
pub(super) const ROOF_MATERIALS: &[(&str, f64)] = &[
    ("Dalle", 36.5),
    ("Planches bois/tuiles", 4.2),
    ("Tôle/ciment/étain", 0.3),
    ("Bois récupéré", 58.7),
    ("Étain/plastique", 0.2),
];

/// Household shares by dwelling type (%).
pub(super) const HOUSEHOLD_TYPES: &[(&str, f64)] = &[
    ("Villa", 0.9),
    ("Appartement", 0.5),
    ("Maison marocaine", 38.8),
    ("Habitat sommaire", 0.4),
    ("Logement rural", 58.9),
    ("Autre", 0.5),
];

pub(super) const PALETTE: &[&str] = &["#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884d8", "#82ca9d", "#ffc658"];
