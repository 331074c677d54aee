use std::collections::VecDeque;

use anyhow::{anyhow, bail, Context, Result};
use quakeview::{
    DiskSource, DispatchReport, FetchRequest, GeoSource, Intent, MemoryWidget, Metric, Page, Session,
};
use tracing::{debug, info};

/// One scripted action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Intent(Intent),
    Open(Page),
}

pub fn parse_step(s: &str) -> Result<Step> {
    if s == "reset" {
        return Ok(Step::Intent(Intent::ResetView));
    }
    let (verb, arg) = s.split_once(':').ok_or_else(|| anyhow!("Step {s:?} must look like verb:argument or reset"))?;
    let step = match verb {
        "select" => Step::Intent(Intent::SelectRegion(arg.to_string())),
        "toggle" => Step::Intent(Intent::ToggleLayer(arg.parse()?)),
        "overlay" => Step::Intent(Intent::ToggleOverlay(arg.parse()?)),
        "class" => Step::Intent(Intent::ToggleSizeClass(arg.to_string())),
        "metric" => Step::Intent(Intent::SetMetric(arg.parse::<Metric>()?)),
        "page" => Step::Open(arg.parse()?),
        _ => bail!("Unknown step verb {verb:?}"),
    };
    Ok(step)
}

/// Plays the host: performs fetches against a geometry source, oldest first.
struct Host<S> {
    source: S,
    queue: VecDeque<FetchRequest>,
}

impl<S: GeoSource> Host<S> {
    fn new(source: S) -> Self { Self { source, queue: VecDeque::new() } }

    fn fetch(&self, fetch: &FetchRequest) -> Result<Vec<u8>> {
        if !self.source.has(&fetch.file) {
            bail!("{} not found under the data root", fetch.file);
        }
        self.source.get(&fetch.file)
    }

    fn settle(&mut self, session: &mut Session<MemoryWidget>, report: DispatchReport) -> Vec<String> {
        let mut warnings: Vec<String> = report.warnings.iter().map(ToString::to_string).collect();
        self.queue.extend(report.fetches);
        while let Some(fetch) = self.queue.pop_front() {
            let Some(dashboard) = session.current_mut() else { break };
            debug!(ticket = %fetch.ticket, file = %fetch.file, "fetching");
            let result = self.fetch(&fetch);
            let report = dashboard.complete_fetch(fetch.ticket, result);
            warnings.extend(report.warnings.iter().map(ToString::to_string));
            self.queue.extend(report.fetches);
        }
        warnings
    }
}

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ReplayArgs) -> Result<()> {
    let config = cli.load_config()?;
    let steps = args.steps.iter()
        .map(|s| parse_step(s).with_context(|| format!("Invalid step {s:?}")))
        .collect::<Result<Vec<_>>>()?;
    let page: Page = args.page.parse()?;

    let mut host = Host::new(DiskSource::new(&args.data_root));
    let mut session = Session::new(config)?;
    let mut widget = MemoryWidget::new();

    info!(%page, root = %args.data_root.display(), "replaying {} steps", steps.len());
    println!("> mount {page}");
    let report = session.open(page, widget.clone())?;
    print_step(&widget, host.settle(&mut session, report));

    for (label, step) in args.steps.iter().zip(steps) {
        println!("> {label}");
        let report = match step {
            Step::Intent(intent) => {
                let dashboard = session.current_mut().ok_or_else(|| anyhow!("no page is mounted"))?;
                dashboard.dispatch(intent)
            }
            Step::Open(page) => {
                // The old widget is destroyed by the session; show its final calls first.
                let old = std::mem::replace(&mut widget, MemoryWidget::new());
                host.queue.clear();
                let report = session.open(page, widget.clone())?;
                for call in old.take_calls() {
                    println!("  {call}");
                }
                report
            }
        };
        print_step(&widget, host.settle(&mut session, report));
    }

    if let Some(dashboard) = session.current() {
        println!("{}", serde_json::to_string_pretty(dashboard.state())?);
        if let Some(stats) = dashboard.stats() {
            println!("communes={} population={} households={}", stats.communes, stats.population, stats.households);
        }
    }
    session.close();
    Ok(())
}

fn print_step(widget: &MemoryWidget, warnings: Vec<String>) {
    for call in widget.take_calls() {
        println!("  {call}");
    }
    for warning in warnings {
        println!("  warning: {warning}");
    }
}
