//! Command-line interface for serving the front-end and offline screening

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{AppConfig, Variant};
use crate::model::{ClassifierModel, ScreeningModel};
use crate::narrative::Narrative;
use crate::patient::{Age, Gender, PatientRecord};
use crate::screening;
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "epilepsy-screen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Epilepsy prediction and screening from EEG features")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web front-end (default)
    Serve(ServeArgs),

    /// Screen a CSV file offline
    Predict(PredictArgs),

    /// Describe a model artifact
    Inspect {
        /// Front-end variant (forest, svm)
        #[arg(long, default_value = "forest")]
        variant: Variant,

        /// Model artifact (defaults to the variant's file)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Front-end variant (forest, svm)
    #[arg(long, default_value = "forest")]
    pub variant: Variant,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Model artifact (defaults to the variant's file)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Where the PDF report is written
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directory with the branding images
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

impl ServeArgs {
    /// Environment defaults with the given flags applied on top
    pub fn into_config(self) -> AppConfig {
        let mut config = AppConfig::from_env(self.variant);
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = self.model {
            config.model_path = model;
        }
        if let Some(report) = self.report {
            config.report_path = report;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// Input data file (CSV with a header row)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Front-end variant (forest, svm)
    #[arg(long, default_value = "forest")]
    pub variant: Variant,

    /// Model artifact (defaults to the variant's file)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Patient name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Patient age in years, clamped to 1..=100
    #[arg(long, default_value_t = 30)]
    pub age: i64,

    /// Patient gender (Male, Female, Other)
    #[arg(long, default_value = "Male")]
    pub gender: Gender,

    /// Write the PDF report here (always written for the forest variant)
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn load_model(variant: Variant, model: Option<PathBuf>) -> anyhow::Result<(PathBuf, ScreeningModel)> {
    let path = model.unwrap_or_else(|| AppConfig::from_env(variant).model_path);
    let model = ScreeningModel::load(&path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    Ok((path, model))
}

// ─── Predict ───────────────────────────────────────────────────────────────────

pub fn cmd_predict(args: PredictArgs) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading model");
    let (_, model) = load_model(args.variant, args.model.clone())?;
    step_done(&format!("{} · {} features", model.kind(), model.n_features()));

    step_run("Loading data");
    let features = DataLoader::new()
        .load_csv(&args.data)
        .with_context(|| format!("Failed to read {}", args.data.display()))?;
    step_done(&format!("{} rows × {} cols", features.n_rows(), features.n_cols()));

    let patient = PatientRecord::new(args.name.as_str(), Age::clamped(args.age), args.gender);

    let start = Instant::now();
    let outcome = screening::screen(&model, patient, &features)?;
    step_ok(&format!(
        "Classified {} rows in {:?} ({} flagged, scaling: {})",
        outcome.rows(),
        start.elapsed(),
        outcome.flagged(),
        model.scaling().name()
    ));

    section("Result");
    println!("  {:<10} {}", muted("Name"), outcome.patient.name);
    println!("  {:<10} {} years", muted("Age"), outcome.patient.age);
    println!("  {:<10} {}", muted("Gender"), outcome.patient.gender);
    println!();
    print_narrative(outcome.narrative);

    let report_path = args
        .report
        .or_else(|| args.variant.writes_report().then(|| AppConfig::from_env(args.variant).report_path));
    if let Some(path) = report_path {
        let bytes = outcome.report().write_pdf(&path)?;
        println!();
        step_ok(&format!("Report written to {} ({} bytes)", path.display(), bytes));
    }

    println!();
    Ok(())
}

fn print_narrative(narrative: Narrative) {
    match narrative {
        Narrative::Symptomatic => {
            println!("  {}", narrative.headline().red().bold());
            println!("  {}", narrative.advice());
            println!();
            println!("  {}", crate::narrative::PREVENTION_HEADING.white().bold());
            for tip in narrative.prevention_tips() {
                println!("    {}", tip);
            }
        }
        Narrative::Clear => {
            println!("  {} {}", narrative.headline().green().bold(), narrative.advice());
        }
    }
}

// ─── Inspect ───────────────────────────────────────────────────────────────────

pub fn cmd_inspect(variant: Variant, model: Option<PathBuf>) -> anyhow::Result<()> {
    section("Model Info");

    let (path, model) = load_model(variant, model)?;

    println!("  {:<14} {}", muted("File"), path.display());
    println!("  {:<14} {}", muted("Kind"), model.kind());
    println!("  {:<14} {}", muted("Features"), model.n_features());
    match model.model() {
        ClassifierModel::RandomForest(forest) => {
            println!("  {:<14} {:?}", muted("Classes"), forest.classes);
            println!("  {:<14} {}", muted("Trees"), forest.n_trees());
            println!("  {:<14} {}", muted("Max depth"), forest.max_depth());
            println!("  {:<14} {}", muted("Leaves"), forest.n_leaves());
        }
        ClassifierModel::Svm(svm) => {
            println!("  {:<14} {:?}", muted("Classes"), svm.classes());
            println!("  {:<14} {:?}", muted("Kernel"), svm.kernel());
            println!("  {:<14} {}", muted("Support vecs"), svm.n_support_vectors());
        }
    }
    let scaling = match model.scaling().name() {
        "persisted" => ok("persisted").to_string(),
        other => other.yellow().to_string(),
    };
    println!("  {:<14} {}", muted("Scaling"), scaling);

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(config: AppConfig) -> anyhow::Result<()> {
    use crate::server::run_server;

    let host = config.host.clone();
    let port = config.port;

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Epilepsy Prediction App".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{} · {}", env!("CARGO_PKG_VERSION"), config.variant))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Web UI ", &format!("http://{}:{}", host, port)));
    line_box(&kv("API    ", &format!("http://{}:{}/api", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}
