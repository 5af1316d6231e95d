//! repo-hotspots CLI - Complexity vs Change Analysis
//!
//! Measures every file of a git repository for complexity and change
//! activity and reports the hotspots.
//!
//! Usage:
//!   repo-hotspots [OPTIONS] [PATH]

use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;

use repo_hotspots::{
    ChangeMode, CompiledConfig, ComplexityMode, analyze, depth_from_level, generate_json,
    generate_summary, generate_table, generate_timings, load_compiled_config,
    web::{ServerConfig, start_server},
};

/// repo-hotspots - Find code that is both complex and frequently changed
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the directory to analyze (must be inside a git repository)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output file for the report (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show the top lists only
    #[arg(short, long)]
    summary: bool,

    /// Write the table as JSON
    #[arg(long, conflicts_with = "summary")]
    json: bool,

    /// Rows in each summary list
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Complexity proxy: lines or indentation
    #[arg(long, value_name = "STRATEGY")]
    complexity: Option<ComplexityMode>,

    /// Change metric: commits or lines
    #[arg(long, value_name = "STRATEGY")]
    changes: Option<ChangeMode>,

    /// Months of history to consider (-1 for the whole history)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    months: Option<i64>,

    /// Aggregate into directory nodes at this depth (0 = top-level entries)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    depth: Option<i64>,

    /// Directory name to exclude (repeatable)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    exclude_dirs: Vec<String>,

    /// File name to exclude (repeatable)
    #[arg(long = "exclude-file", value_name = "NAME")]
    exclude_files: Vec<String>,

    /// Config file path (default: search for .hotspots.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show timing information
    #[arg(long)]
    timing: bool,

    /// Number of threads for parallel processing (default: all CPU cores)
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    // === Web visualization options ===
    /// Start web server for interactive visualization
    #[arg(long)]
    web: bool,

    /// Port for web server (default: 3000)
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Don't open browser automatically when starting web server
    #[arg(long)]
    no_open: bool,

    /// API endpoint URL for frontend (useful for separate deployments)
    #[arg(long)]
    api_endpoint: Option<String>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Apply command-line overrides on top of the file configuration
fn apply_overrides(config: &mut CompiledConfig, args: &Args) {
    if let Some(mode) = args.complexity {
        config.complexity = mode;
    }
    if let Some(mode) = args.changes {
        config.changes = mode;
    }
    if let Some(months) = args.months {
        config.months_back = months;
    }
    if let Some(level) = args.depth {
        config.depth = depth_from_level(level);
    }
    if let Some(top) = args.top {
        config.top = top;
    }
    config.exclude_dirs.extend(args.exclude_dirs.iter().cloned());
    config.exclude_files.extend(args.exclude_files.iter().cloned());
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Detect available CPU cores
    let available_cores = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    // Configure thread pool
    let num_threads = args.jobs.unwrap_or(available_cores);
    if args.jobs.is_some() {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .unwrap_or_else(|e| eprintln!("Warning: Could not set thread count: {}", e));
    }

    if args.verbose || args.timing {
        eprintln!(
            "Using {} thread(s) for parallel processing ({} CPU cores available)",
            num_threads, available_cores
        );
    }

    let total_start = Instant::now();

    // Load configuration file; a broken file is an error, a missing one is not
    let config_path = args.config.as_ref().unwrap_or(&args.path);
    let mut config = load_compiled_config(config_path)?;
    if args.verbose {
        match &config.source {
            Some(source) => eprintln!("Loaded configuration from {}", source.display()),
            None => eprintln!("Note: No config file found, using defaults"),
        }
    }
    apply_overrides(&mut config, &args);

    eprintln!("Analyzing repository at '{}'...", args.path.display());
    let analysis = analyze(&args.path, &config)?;

    eprintln!(
        "Analysis complete: {} files, {} rows\n",
        analysis.files,
        analysis.table.rows.len()
    );

    if args.timing {
        let mut err = std::io::stderr();
        generate_timings(&analysis.timings, &mut err)?;
        writeln!(err)?;
    }

    // Web visualization mode
    if args.web {
        let server_config = ServerConfig {
            port: args.port,
            open_browser: !args.no_open,
            api_endpoint: args.api_endpoint.clone(),
        };

        // Run the web server using tokio runtime
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(start_server(analysis.table, server_config))
            .map_err(|e| -> Box<dyn std::error::Error> { e })?;

        return Ok(());
    }

    // Generate output
    let output: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(stdout()),
    };

    let mut writer = output;

    if args.json {
        generate_json(&analysis.table, &mut writer)?;
    } else if args.summary {
        generate_summary(&analysis.table, config.top, &mut writer)?;
    } else {
        generate_table(&analysis.table, &mut writer)?;
    }
    writer.flush()?;

    // Notify about output file
    if let Some(path) = &args.output {
        eprintln!("Report written to: {}", path.display());
    }

    // Show total timing
    if args.timing {
        let total_time = total_start.elapsed();
        let files_per_sec = analysis.files as f64 / total_time.as_secs_f64();
        eprintln!(
            "Total time: {:.2?} ({:.1} files/sec)",
            total_time, files_per_sec
        );
    }

    Ok(())
}
