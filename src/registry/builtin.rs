use super::region::{FileRef, RegionEntry, Registry};

const COMMUNE_BOUNDARIES: &str = "decoupage_administrative/commune_alhouz.geojson";

/// Al Haouz communes: (name, lon, lat).
const COMMUNES: [(&str, f64, f64); 35] = [
    ("Abadou", -7.308, 31.588),
    ("Ait Ourir", -7.672, 31.561),
    ("Ait Sidi Daoud", -7.67, 31.618),
    ("Amghras", -8.177, 31.217),
    ("Amizmiz", -8.248, 31.219),
    ("Anougal", -8.276, 31.108),
    ("Asni", -7.92, 31.175),
    ("Azgour", -8.359, 31.13),
    ("Dar Jamaa", -8.386, 31.252),
    ("Ghmate", -7.79, 31.419),
    ("Ighil", -8.359, 30.999),
    ("Iguerferouane", -7.677, 31.399),
    ("Ijoukak", -8.058, 30.994),
    ("Imgdal", -8.13, 31.103),
    ("Lalla Takarkoust", -8.131, 31.326),
    ("Moulay Brahim", -8.015, 31.319),
    ("Oukaimden", -7.831, 31.219),
    ("Oulad Mtaa", -8.266, 31.326),
    ("Ouazguita", -8.089, 31.259),
    ("Ourika", -7.806, 31.343),
    ("Ouirgane", -8.03, 31.16),
    ("Sidi Abdallah Ghiat", -7.851, 31.522),
    ("Sidi Badhaj", -8.204, 31.331),
    ("Sti Fadma", -7.709, 31.242),
    ("Tahannaout", -7.946, 31.359),
    ("Talat N Yaaqoub", -8.26, 30.955),
    ("Tamaguert", -7.546, 31.547),
    ("Tamazouzte", -7.786, 31.489),
    ("Tameslohte", -8.066, 31.46),
    ("Tazart", -7.394, 31.575),
    ("Tidili Mesfioua", -7.619, 31.477),
    ("Tighedouine", -7.533, 31.355),
    ("Tizguine", -8.318, 31.26),
    ("Touama", -7.483, 31.56),
    ("Zerkten", -7.352, 31.401),
];

/// Damage-analysis zones: (name, lon, lat, boundary file, buildings file).
const DAMAGE_ZONES: [(&str, f64, f64, &str, &str); 5] = [
    ("Adebdi", -8.4642, 30.7765, "dega/zonne/Adebdi.geojson", "dega/Adebdi_avec_degats.geojson"),
    ("Chichaoua", -8.7790, 31.5277, "dega/zonne/chichoua.geojson", "dega/chichaoua_avec_degats.geojson"),
    ("Lalla Aziza", -8.6106, 31.0873, "dega/zonne/lallaAziza.geojson", "dega/lallaAziza_avec_degats.geojson"),
    ("Marrakech", -8.0089, 31.6295, "dega/zonne/marrakech.geojson", "dega/marrakech_avec_degats.geojson"),
    ("Taroudant", -8.8767, 30.4709, "dega/zonne/Taroudant.geojson", "dega/Taroudant_avec_degats.geojson"),
];

impl Registry {
    /// Communes of Al Haouz sharing one boundary file, one pre-event buildings file each.
    pub fn al_haouz() -> Self {
        let boundary = FileRef::new(COMMUNE_BOUNDARIES);
        let regions = COMMUNES.iter()
            .map(|&(name, lon, lat)| {
                let buildings = FileRef::new(format!("buildings/before/{name}.geojson"));
                RegionEntry::new(name, lon, lat, boundary.clone(), Some(buildings))
            })
            .collect();
        Self::new(regions).expect("built-in commune table is valid")
    }

    /// Zones with damage-annotated building footprints, each with its own boundary.
    pub fn damage_zones() -> Self {
        let regions = DAMAGE_ZONES.iter()
            .map(|&(name, lon, lat, boundary, buildings)| {
                RegionEntry::new(name, lon, lat, FileRef::new(boundary), Some(FileRef::new(buildings)))
            })
            .collect();
        Self::new(regions).expect("built-in damage zone table is valid")
    }
}
