use anyhow::Result;
use quakeview::{chart_kind, chart_records, reference_lines, Metric};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ChartArgs) -> Result<()> {
    let Some(name) = &args.metric else {
        for metric in Metric::ALL {
            println!("{}", metric.label());
        }
        return Ok(());
    };
    let metric: Metric = name.parse()?;
    let records = chart_records(metric);

    if args.json {
        let out = serde_json::json!({
            "metric": metric,
            "kind": chart_kind(metric),
            "records": records,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("# {metric}");
    let width = records.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
    for record in &records {
        println!("{:<width$}  {:>5.1}", record.name, record.value);
    }
    if metric == Metric::PovertyRate {
        for line in reference_lines() {
            println!("-- {} ({}%)", line.label, line.value);
        }
    }
    Ok(())
}
