//! Cloudburst CLI
//!
//! Command-line interface for Cloudburst:
//! - Analyze a local history export
//! - Load a stored report by id or dashboard link
//! - Show demo data and the category table
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use cloudburst::config::{generate_default_config, Config};
use cloudburst::history::{aggregate, AggregateResult, CategoryTable};
use cloudburst::report::{
    resolve_report_id, DashboardState, DashboardView, ReportClient, ReportDocument, ReportSession,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cloudburst")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browsing-history analytics")]
#[command(long_about = "Cloudburst turns uploaded browsing history into screen-time statistics.\nAnalyze an export locally or load a stored report.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate a history export stored in a local JSON file
    Analyze {
        /// Path to the JSON document
        path: PathBuf,
        /// Number of top domains to show
        #[arg(long)]
        top_n: Option<usize>,
        /// Minutes attributed to each visit
        #[arg(long)]
        minutes_per_visit: Option<u32>,
    },

    /// Load a stored report
    Report {
        /// Report id, `/report/<id>` path or dashboard URL
        target: String,
        /// Report service URL (overrides config)
        #[arg(long)]
        report_url: Option<String>,
    },

    /// Show the sample dashboard
    Demo,

    /// List the active categories in match order
    Categories,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudburst=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    match cli.command {
        Commands::Analyze {
            path,
            top_n,
            minutes_per_visit,
        } => {
            let bytes = std::fs::read(&path).with_context(|| format!("reading {:?}", path))?;
            let document = ReportDocument::from_slice(&bytes)
                .with_context(|| format!("{:?} is not a history document", path))?;

            let mut options = config.aggregation.options();
            if let Some(n) = top_n {
                options = options.top_n(n);
            }
            if let Some(m) = minutes_per_visit {
                options = options.minutes_per_visit(m);
            }

            let result = aggregate(
                &document.entries,
                &config.aggregation.category_table(),
                &options,
            );
            print_result(&cli.format, &result)?;
        }

        Commands::Report { target, report_url } => {
            let Some(report_id) = resolve_report_id(&target) else {
                eprintln!("Not a report id or report link: {}", target);
                std::process::exit(1);
            };

            let mut client_config = config.report.client_config();
            if let Some(url) = report_url {
                client_config.base_url = url;
            }
            let client = ReportClient::new(client_config)?;

            let mut session = ReportSession::new(
                Arc::new(config.aggregation.category_table()),
                config.aggregation.options(),
            );

            match session.load(&client, &report_id).await {
                DashboardState::Loaded { report_id, result } => {
                    if cli.format == "table" {
                        print_view(&DashboardView::live(report_id.clone(), result));
                        println!();
                    }
                    print_result(&cli.format, result)?;
                }
                state => {
                    tracing::debug!(state = state.name(), "Report did not load");
                    eprintln!("Unable to load report {}", report_id);
                    eprintln!("{}", session.message().unwrap_or_default());
                    eprintln!();
                    eprintln!("Check the ID and try again, or analyze your history again from the extension.");
                    std::process::exit(1);
                }
            }
        }

        Commands::Demo => {
            let view = DashboardView::demo();
            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&view)?),
                _ => print_view(&view),
            }
        }

        Commands::Categories => {
            let table = config.aggregation.category_table();
            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&table)?),
                _ => print_categories(&table),
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn print_result(format: &str, result: &AggregateResult) -> anyhow::Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(result)?),
        "csv" => print_csv(result)?,
        _ => print_table(result),
    }
    Ok(())
}

fn print_table(result: &AggregateResult) {
    println!("Total visits:      {}", result.total_visits);
    println!("Est. screen time:  {:.1} hrs", result.total_screen_time_hours);
    println!("Time leakage:      {:.1} hrs", result.leakage_hours);
    println!();

    println!("{:<4} {:<40} {:>8}", "#", "Domain", "Visits");
    println!("{}", "-".repeat(54));
    for (i, d) in result.top_domains.iter().enumerate() {
        println!("{:<4} {:<40} {:>8}", i + 1, d.domain, d.visits);
    }
    println!();

    println!("{:<20} {:>8} {:>7}", "Category", "Visits", "Share");
    println!("{}", "-".repeat(37));
    for c in &result.category_breakdown {
        let share = if result.total_visits > 0 {
            c.visits as f64 * 100.0 / result.total_visits as f64
        } else {
            0.0
        };
        println!("{:<20} {:>8} {:>6.1}%", c.name, c.visits, share);
    }
    println!();

    print_activity(result.weekly_activity());
}

fn print_activity<'a>(days: impl Iterator<Item = (&'a str, f64)>) {
    let days: Vec<(&str, f64)> = days.collect();
    let max = days.iter().map(|(_, h)| *h).fold(0.0_f64, f64::max);

    println!("Weekly activity (est. hours)");
    for (day, hours) in days {
        let width = if max > 0.0 {
            (hours / max * 30.0).round() as usize
        } else {
            0
        };
        println!("  {} {:<30} {:.1}", day, "#".repeat(width), hours);
    }
}

fn print_view(view: &DashboardView) {
    println!("{}", view.headline);
    match &view.report_id {
        Some(id) => println!("ID: {}", id),
        None => println!("Demo analysis based on sample data"),
    }
    println!();
    println!("Est. Screen Time:  {}", view.stats.total_screen_time);
    println!("Most Visited:      {}", view.stats.most_visited);
    println!("Visits:            {}", view.stats.visits);
    println!("Time Leakage:      {}", view.stats.leakage);
    println!();

    for slice in &view.categories {
        println!("  {:<20} {:>8}  {}", slice.name, slice.value, slice.color);
    }
    println!();

    print_activity(view.activity.iter().map(|bar| (bar.name.as_str(), bar.hours)));
}

fn print_categories(table: &CategoryTable) {
    println!("{:<16} {:<8} {:<8} {}", "Category", "Color", "Leakage", "Keywords");
    println!("{}", "-".repeat(72));
    for rule in table.rules() {
        println!(
            "{:<16} {:<8} {:<8} {}",
            rule.name,
            rule.display_color(),
            if rule.leakage { "yes" } else { "no" },
            rule.keywords.join(", ")
        );
    }
    let fallback = table.fallback();
    println!(
        "{:<16} {:<8} {:<8} (no match)",
        fallback.name,
        fallback.display_color(),
        "no"
    );
}

fn print_csv(result: &AggregateResult) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["section", "name", "value"])?;

    writer.write_record(["total", "visits", &result.total_visits.to_string()])?;
    writer.write_record([
        "total",
        "screen_time_hours",
        &format!("{:.1}", result.total_screen_time_hours),
    ])?;
    writer.write_record(["total", "leakage_hours", &format!("{:.1}", result.leakage_hours)])?;

    for d in &result.top_domains {
        writer.write_record(["domain", &d.domain, &d.visits.to_string()])?;
    }
    for c in &result.category_breakdown {
        writer.write_record(["category", &c.name, &c.visits.to_string()])?;
    }
    for (day, hours) in result.weekly_activity() {
        writer.write_record(["weekday", day, &format!("{:.1}", hours)])?;
    }

    writer.flush()?;
    std::io::stdout().flush()?;
    Ok(())
}
