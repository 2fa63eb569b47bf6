use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;

use shopnav::cli::{Cli, Command};
use shopnav::entry::{AffiliateSection, TabName};
use shopnav::restore::{Product, ViewSink};
use shopnav::script::{Script, ScriptRunner, Step, TraceRecord};

/// View layer stand-in for the harness: prints what the storefront UI
/// would render.
struct ConsoleView;

impl ViewSink for ConsoleView {
    fn select_home(&mut self) {
        println!("  view: home");
    }

    fn select_tab(&mut self, tab: TabName) {
        println!("  view: tab {}", tab.label());
    }

    fn show_product(&mut self, product: &Product) {
        println!("  view: product #{} “{}”", product.id, product.title);
    }

    fn clear_product(&mut self) {
        println!("  view: product closed");
    }

    fn open_cms(&mut self) {
        println!("  view: cms opened");
    }

    fn close_cms(&mut self) {
        println!("  view: cms closed");
    }

    fn show_affiliate_tab(&mut self, section: AffiliateSection) {
        println!("  view: affiliate {}", section.label());
    }

    fn show_exit_prompt(&mut self) {
        println!("  view: “Leave the store?” dialog shown");
    }

    fn hide_exit_prompt(&mut self) {
        println!("  view: exit dialog hidden");
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Replay { script, out } => {
            let text = fs::read_to_string(&script)
                .with_context(|| format!("reading {}", script.display()))?;
            let parsed: Script = serde_json::from_str(&text).context("parsing script JSON")?;
            let trace = run(&parsed);
            write_trace(&trace, &out)?;
            Ok(())
        }

        Command::Demo => {
            run(&demo_script());
            Ok(())
        }
    }
}

fn run(script: &Script) -> Vec<TraceRecord> {
    let mut runner = ScriptRunner::new(script, ConsoleView);
    let mut trace = Vec::with_capacity(script.steps.len());

    for (i, step) in script.steps.iter().enumerate() {
        println!("{:>3}. {}", i + 1, step.name());
        let record = runner.apply(i, step);
        println!("     stack [{}]{}", record.stack.join(" › "), flags(&record));
        trace.push(record);
    }
    trace
}

fn flags(record: &TraceRecord) -> String {
    let mut s = String::new();
    if record.confirmation_showing {
        s.push_str("  (confirming exit)");
    }
    if record.allow_exit {
        s.push_str("  (exit armed)");
    }
    if record.exited {
        s.push_str("  (left the site)");
    }
    s
}

fn write_trace(trace: &[TraceRecord], out: &Path) -> Result<()> {
    fs::write(out, serde_json::to_string_pretty(trace)?)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("✓ Wrote {}", out.display());
    Ok(())
}

/// The back-button story in one pass: pops, a product deleted behind the
/// stack, then the exit confirmation and a confirmed leave.
fn demo_script() -> Script {
    Script {
        admin: false,
        affiliate: false,
        fragment: None,
        products: vec![
            Product {
                id: 42,
                title: "Linen tote".into(),
            },
            Product {
                id: 7,
                title: "Walnut desk organizer".into(),
            },
        ],
        steps: vec![
            Step::NavigateTo { tab: TabName::Cart },
            Step::OpenProduct { id: 42 },
            Step::Back,
            Step::OpenProduct { id: 7 },
            Step::NavigateTo {
                tab: TabName::Orders,
            },
            Step::RemoveProduct { id: 7 },
            Step::Back,
            Step::Back,
            Step::Back,
            Step::Back,
            Step::ConfirmExit,
        ],
    }
}
