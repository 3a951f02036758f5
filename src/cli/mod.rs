//! procal CLI Module
//!
//! Command-line front end for the bias-variance session, the curve plot and
//! the data readers.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::AppConfig;
use crate::data::{load_retention_times, read_percolator};
use crate::render::{PlottersSurface, Theme};
use crate::session::{plot_curve, BiasVarianceSession, FitHistory};
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(1, 188, 163) }
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

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_failed(err: &dyn std::fmt::Display) {
    println!("{} {}", "failed".red(), dim(&err.to_string()));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "procal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bias-variance trade-off with k-NN on PROCAL retention times")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every command; they override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Plot theme (default, slides)
    #[arg(long, global = true)]
    pub theme: Option<String>,

    /// Column holding the precomputed peptide feature
    #[arg(long, global = true)]
    pub feature_column: Option<String>,

    /// Substring selecting the replicate to use
    #[arg(long, global = true)]
    pub replicate: Option<String>,

    /// Number of validation samples
    #[arg(long, global = true)]
    pub n_test: Option<usize>,

    /// Seed for the train/validation shuffle
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit k-NN for each k in order and plot the bias-variance trade-off
    Fit {
        /// Skyline CSV export (defaults to the configured path)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Neighbor counts, fitted in the given order
        #[arg(short = 'k', long = "k", num_args = 1.., required = true)]
        k: Vec<usize>,

        /// Output figure (.svg or .png)
        #[arg(short, long, default_value = "bias_variance.svg")]
        output: PathBuf,

        /// Write the fit history as JSON
        #[arg(long)]
        history_out: Option<PathBuf>,
    },

    /// Plot the training and validation sets without fitting
    Inspect {
        /// Skyline CSV export (defaults to the configured path)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output figure (.svg or .png)
        #[arg(short, long, default_value = "inspect.svg")]
        output: PathBuf,
    },

    /// Plot f(x) = x * sin(x * p) on [0, 10]
    Curve {
        /// Curve parameter p
        #[arg(short, long, allow_hyphen_values = true)]
        parameter: String,

        /// Output figure (.svg or .png)
        #[arg(short, long, default_value = "curve.svg")]
        output: PathBuf,
    },

    /// Read a Percolator input (PIN) file
    Pin {
        /// PIN file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show data information
    Info {
        /// Input data file (CSV or TSV)
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Configuration ─────────────────────────────────────────────────────────────

/// Config file (or defaults) with command-line overrides applied
pub fn resolve_config(global: &GlobalArgs, data: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut config = match &global.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(path) = data {
        config.data.path = path.to_path_buf();
    }
    if let Some(theme) = &global.theme {
        config.theme = theme.clone();
    }
    if let Some(column) = &global.feature_column {
        config.data.feature_column = column.clone();
        config.session.feature_label = column.clone();
    }
    if let Some(replicate) = &global.replicate {
        config.data.replicate_stem = replicate.clone();
    }
    if let Some(n_test) = global.n_test {
        config.data.n_test = n_test;
    }
    if let Some(seed) = global.seed {
        config.data.random_state = seed;
    }
    config.validate()?;
    Ok(config)
}

fn load_session(config: &AppConfig) -> anyhow::Result<BiasVarianceSession> {
    step_run(&format!("Loading {}", config.data.path.display()));
    let start = Instant::now();
    let split = load_retention_times(&config.data, None)?;
    step_done(&format!(
        "{} train / {} validation in {:?}",
        split.train.len(),
        split.validation.len(),
        start.elapsed()
    ));
    let session = BiasVarianceSession::new(split.train, split.validation)?
        .with_config(config.session.clone())?;
    Ok(session)
}

fn surface_for(path: &Path, theme: Theme) -> anyhow::Result<PlottersSurface> {
    Ok(PlottersSurface::new(path)?.with_theme(theme))
}

fn print_history(session: &BiasVarianceSession) {
    let n_train = session.train().len();
    let points = session.history().by_flexibility(n_train);

    println!();
    println!(
        "  {:>6} {:>6} {:>14} {:>14}",
        muted("Flex"),
        muted("k"),
        muted("Train MSE"),
        muted("Val MSE")
    );
    println!("  {}", dim(&"─".repeat(43)));
    for p in &points {
        println!(
            "  {:>6} {:>6} {:>14.4} {:>14.4}",
            p.flexibility, p.k, p.train_mse, p.val_mse
        );
    }

    if let Some(best) = points
        .iter()
        .min_by(|a, b| a.val_mse.total_cmp(&b.val_mse))
    {
        println!();
        println!(
            "  {} {} {} {:.4}",
            ok("best"),
            format!("k = {}", best.k).white().bold(),
            muted("validation MSE:"),
            best.val_mse
        );
    }
    println!();
}

/// Write the fit history as JSON, in call order
pub fn write_history(path: &Path, history: &FitHistory) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), history)?;
    Ok(())
}

/// Neighbor count typed at the prompt. Integers below 1 map to 0 so the
/// session reports its own range error; anything else is `None`.
fn parse_neighbor_count(raw: &str) -> Option<usize> {
    raw.parse::<usize>()
        .ok()
        .or_else(|| raw.parse::<i64>().ok().map(|_| 0))
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_fit(
    global: &GlobalArgs,
    data: Option<&Path>,
    ks: &[usize],
    output: &Path,
    history_out: Option<&Path>,
) -> anyhow::Result<()> {
    section("Fit");

    let config = resolve_config(global, data)?;
    let mut session = load_session(&config)?;
    let mut surface = surface_for(output, config.resolve_theme()?)?;

    for &k in ks {
        step_run(&format!("Fitting k = {}", k.to_string().cyan()));
        match session.fit_and_record(k, &mut surface) {
            Ok(entry) => step_done(&format!(
                "train {:.4} · validation {:.4}",
                entry.train_mse, entry.val_mse
            )),
            Err(e) if e.is_invalid_parameter() => step_failed(&e),
            Err(e) => return Err(e.into()),
        }
    }

    print_history(&session);

    if let Some(path) = history_out {
        step_run(&format!("Saving history → {}", path.display()));
        write_history(path, session.history())?;
        step_done(&format!("{} entries", session.history().len()));
    }

    println!("  {} {}", muted("Figure"), output.display());
    println!();
    Ok(())
}

pub fn cmd_inspect(global: &GlobalArgs, data: Option<&Path>, output: &Path) -> anyhow::Result<()> {
    section("Inspect");

    let config = resolve_config(global, data)?;
    let session = load_session(&config)?;
    let mut surface = surface_for(output, config.resolve_theme()?)?;

    step_run("Rendering");
    session.inspect_data(&mut surface)?;
    step_done(&output.display().to_string());

    println!();
    Ok(())
}

pub fn cmd_curve(global: &GlobalArgs, parameter: &str, output: &Path) -> anyhow::Result<()> {
    section("Curve");

    let config = resolve_config(global, None)?;
    let mut surface = surface_for(output, config.resolve_theme()?)?;

    step_run(&format!("Rendering f(x) = x·sin(x·{})", parameter));
    match plot_curve(parameter, &mut surface) {
        Ok(()) => step_done(&output.display().to_string()),
        Err(e) => {
            step_failed(&e);
            return Err(e.into());
        }
    }

    println!();
    Ok(())
}

pub fn cmd_pin(file: &Path) -> anyhow::Result<()> {
    section("Percolator Input");

    let df = read_percolator(file)?;

    println!("  {:<12} {}", muted("File"), file.display());
    println!("  {:<12} {}", muted("PSMs"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!("  {:<24} {:<12}", muted("Column"), muted("Type"));
    println!("  {}", dim(&"─".repeat(38)));
    for col in df.get_columns() {
        println!(
            "  {:<24} {:<12}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140)
        );
    }

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let loader = DataLoader::new();
    let info = loader.get_file_info(data_path)?;
    let df = loader.load_auto(data_path)?;

    println!("  {:<12} {}", muted("File"), info.path);
    println!("  {:<12} {:.1} KB", muted("Size"), info.file_size as f64 / 1024.0);
    println!("  {:<12} {}", muted("Rows"), info.n_rows);
    println!("  {:<12} {}", muted("Columns"), info.n_cols);
    println!();

    println!("  {:<28} {:<12} {:>6}", muted("Column"), muted("Type"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(48)));

    for col in df.get_columns() {
        println!(
            "  {:<28} {:<12} {:>6}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
        );
    }

    println!();
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner(session: &BiasVarianceSession, output: &Path) {
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "procal-knn".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Training  ", &session.train().len().to_string()));
    line_box(&kv("Validation", &session.validation().len().to_string()));
    line_box(&kv("Figure    ", &output.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!(
        "{}",
        dim(&format!("k in 1..={} · enter to inspect · reset · q", session.train().len()))
    ));
    line_box_empty();
    line_box_bottom();
    println!();
}

pub fn cmd_interactive(global: &GlobalArgs) -> anyhow::Result<()> {
    use dialoguer::{theme::ColorfulTheme, Input};

    let prompt_theme = ColorfulTheme {
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(43),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    };

    let defaults = resolve_config(global, None)?;
    let data: String = Input::with_theme(&prompt_theme)
        .with_prompt("Skyline export")
        .default(defaults.data.path.display().to_string())
        .interact_text()?;
    let output: String = Input::with_theme(&prompt_theme)
        .with_prompt("Figure")
        .default("bias_variance.svg".to_string())
        .interact_text()?;
    let output = PathBuf::from(output);

    let config = resolve_config(global, Some(Path::new(&data)))?;
    let mut session = load_session(&config)?;
    let mut surface = surface_for(&output, config.resolve_theme()?)?;

    print_banner(&session, &output);

    loop {
        let input: String = Input::with_theme(&prompt_theme)
            .with_prompt("k")
            .allow_empty(true)
            .interact_text()?;
        let input = input.trim();

        match input {
            "q" | "quit" | "exit" => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
            "reset" => {
                session.reset_history();
                println!("  {} {}", ok("✓"), "history cleared");
            }
            "" => {
                step_run("Inspecting");
                session.inspect_data(&mut surface)?;
                step_done(&output.display().to_string());
            }
            raw => {
                let k = match parse_neighbor_count(raw) {
                    Some(k) => k,
                    None => {
                        println!("  {} {}", "✗".red(), muted(&format!("'{}' is not a neighbor count", raw)));
                        continue;
                    }
                };
                step_run(&format!("Fitting k = {}", k.to_string().cyan()));
                match session.fit_and_record(k, &mut surface) {
                    Ok(entry) => {
                        step_done(&format!(
                            "train {:.4} · validation {:.4}",
                            entry.train_mse, entry.val_mse
                        ));
                        print_history(&session);
                    }
                    Err(e) if e.is_invalid_parameter() => step_failed(&e),
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(())
}
