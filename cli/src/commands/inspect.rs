use anyhow::{bail, Context, Result};
use quakeview::{list_geojson, BuildingSummary, GeoDocument};
use tracing::info;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let config = cli.load_config()?;
    let classes = config.size_classes()?;
    let files = list_geojson(&args.path)?;
    if files.is_empty() {
        bail!("no .geojson files under {}", args.path.display());
    }

    let mut summaries = Vec::with_capacity(files.len());
    for path in &files {
        info!(path = %path.display(), "reading");
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = GeoDocument::parse(&bytes).with_context(|| format!("Invalid GeoJSON in {}", path.display()))?;
        let summary = BuildingSummary::from_document(&doc, &classes, &config.area_attribute, &config.damage_attribute);
        summaries.push((path, summary));
    }

    if args.json {
        let out: Vec<_> = summaries.iter()
            .map(|(path, summary)| serde_json::json!({ "file": path.display().to_string(), "summary": summary }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (path, summary) in &summaries {
        println!("{} ({} buildings, {:.0} m²)", path.display(), summary.total, summary.total_area);
        for (label, count) in &summary.by_class {
            println!("  {label:<12} {count:>8}");
        }
        if summary.unclassified > 0 {
            println!("  {:<12} {:>8}", "(no area)", summary.unclassified);
        }
        for (state, count) in summary.by_damage.iter().filter(|(_, n)| *n > 0) {
            println!("  {:<12} {count:>8}", state.source_label());
        }
    }
    Ok(())
}
