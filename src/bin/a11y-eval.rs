//! a11y-eval command line
//!
//! Evaluates a live page (through Chrome) or a captured snapshot file against
//! a named ruleset and prints the JSON export or a short summary.

use a11y_eval::browser::normalize_url;
use a11y_eval::{BrowserSession, EvaluationResult, EventProcessing, Evaluator, Features, LaunchOptions,
                RuleRegistry, SnapshotNode};
use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "a11y-eval")]
#[command(version)]
#[command(about = "Evaluate a web page against WCAG accessibility rules", long_about = None)]
struct Cli {
    /// URL or local HTML file to evaluate
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Ruleset to run
    #[arg(long, short = 'r', default_value = "WCAG20")]
    ruleset: String,

    /// Inline event handler checks: none or allowed
    #[arg(long, value_name = "MODE", default_value = "none")]
    event_processing: String,

    /// Report links whose targets need checking
    #[arg(long)]
    broken_link_testing: bool,

    /// Evaluate a snapshot JSON file instead of a live page
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    snapshot: Option<PathBuf>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// List rules and rulesets, then exit
    #[arg(long)]
    list_rules: bool,

    /// Print only the summary
    #[arg(long)]
    summary_only: bool,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let registry = RuleRegistry::with_defaults();

    if cli.list_rules {
        list_rules(&registry);
        return Ok(());
    }

    let event_processing: EventProcessing = cli.event_processing.parse()?;
    let features = Features::default()
        .with_event_processing(event_processing)
        .with_broken_link_testing(cli.broken_link_testing);

    // Configuration errors surface before any page is loaded
    let ruleset = registry.get_ruleset(&cli.ruleset)?;
    let evaluator = Evaluator::new(ruleset, features);

    let result = match (&cli.snapshot, &cli.url) {
        (Some(path), _) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
            let document = SnapshotNode::from_json(&json)?;
            evaluator.evaluate(&document)
        }
        (None, Some(url)) => {
            let mut options = LaunchOptions::new().headless(!cli.headed);
            if let Some(path) = &cli.chrome_path {
                options = options.chrome_path(path.clone());
            }
            let session = BrowserSession::launch(options)?;
            let url = normalize_url(url);
            eprintln!("Evaluating {} with ruleset {}", url, cli.ruleset);
            session.evaluate_url(&url, &evaluator)?
        }
        (None, None) => bail!("Nothing to evaluate: pass a URL or --snapshot <FILE>"),
    };

    if cli.summary_only {
        print_summary(&result);
    } else {
        println!("{}", result.to_json(!cli.compact)?);
    }

    Ok(())
}

fn list_rules(registry: &RuleRegistry) {
    println!("RULES:");
    for rule in registry.rules() {
        let definition = rule.definition();
        println!(
            "    {:<12} {:<16} {:<8} WCAG {}",
            definition.rule_id,
            definition.category.label(),
            format!("{:?}", definition.group),
            definition.wcag_primary_id
        );
    }
    println!();
    println!("RULESETS:");
    for ruleset in registry.rulesets() {
        println!("    {:<16} {}", ruleset.id, ruleset.title);
    }
}

fn print_summary(result: &EvaluationResult) {
    let summary = result.summary();
    let totals = &summary.totals;

    println!("Ruleset: {}", result.ruleset_id());
    println!(
        "Violations: {}  Warnings: {}  Manual checks: {}  Passed: {}  Hidden: {}",
        totals.violations, totals.warnings, totals.manual_check, totals.pass, totals.hidden
    );
    println!();
    for (category, counts) in &summary.by_category {
        println!(
            "    {:<16} V:{:<4} W:{:<4} MC:{:<4} P:{:<4}",
            category.label(),
            counts.violations,
            counts.warnings,
            counts.manual_check,
            counts.pass
        );
    }
    for diagnostic in result.diagnostics() {
        eprintln!("{} {}: {}", diagnostic.code, diagnostic.rule_id, diagnostic.message);
    }
}
