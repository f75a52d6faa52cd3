//! CLI entrypoint for `ldapscout`.
//!
//! Parses command-line arguments, validates the input dump and filter
//! configuration, loads entries through the library engine with optional mmap
//! threshold selection, prints the terminal report, and optionally writes a
//! CSV export when an output directory is provided.
use std::fs;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{LevelFilter, error, warn};
use ldapscout::{
    engine::Engine,
    export::save_report_csv,
    filter::FilterConfig,
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    registry::StandardRegistry,
    render::render_report,
    report::Mode,
};

#[derive(Parser, Debug)]
#[command(
    name = "ldapscout",
    version,
    about = "Show non-standard and rare LDAP fields from a directory dump",
    after_help = "Example LDAP search: ldapsearch -x -LLL -H ldap://<LDAP_SERVER> -D '<bind_dn>' -w <password> -b '<base_dn>' '(objectClass=user)' '*'"
)]
struct Args {
    /// Path to the ldapsearch / LDIF output file
    input: PathBuf,

    /// Fields to exclude from output and from qualification
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    exclude: Vec<String>,

    /// Fields to add to users that already have non-standard data
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    include: Vec<String>,

    /// Show every user that has any of these fields
    #[arg(long = "include-all", num_args = 1.., value_delimiter = ',')]
    include_all: Vec<String>,

    /// List all fields with their occurrence counts
    #[arg(long = "list-fields", conflicts_with = "list_users")]
    list_fields: bool,

    /// List all users, highlighting those with non-standard or rare fields
    #[arg(long = "list-users")]
    list_users: bool,

    /// Rare standard field threshold (1 = 10%, 2 = 25%, 3 = 50%, 4 = 75%, 5 = 95%)
    #[arg(long, default_value_t = 2)]
    level: u8,

    /// File of additional standard field names, one per line
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Use only the names from --registry instead of extending the built-in set
    #[arg(long = "replace-registry", requires = "registry")]
    replace_registry: bool,

    /// Path to the output directory for a CSV export
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Override mmap threshold in bytes. If zero, disable mmap.
    #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
    mmap_threshold: u64,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log counts of skipped blocks and folded lines encountered during parsing
    #[arg(long = "log-parse-stats")]
    log_parse_stats: bool,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Suppress report output (still writes exports if -o is provided)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.list_fields {
            Mode::ListFields
        } else if self.list_users {
            Mode::ListUsers
        } else {
            Mode::Report
        }
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

fn verify_inputs(args: &Args) -> Result<()> {
    if !args.input.exists() {
        bail!("input file not found: {}", args.input.display());
    }
    if let Some(p) = &args.registry {
        if !p.exists() {
            warn!(
                "registry file not found: {} (continuing with built-in fields)",
                p.display()
            );
        }
    }
    Ok(())
}

fn load_registry(args: &Args) -> Result<StandardRegistry> {
    let Some(path) = args.registry.as_ref().filter(|p| p.exists()) else {
        return Ok(StandardRegistry::default());
    };
    let extra = StandardRegistry::from_file(path)?;
    if args.replace_registry {
        return Ok(extra);
    }
    let mut registry = StandardRegistry::default();
    registry.merge(extra);
    Ok(registry)
}

fn mode_slug(mode: Mode) -> &'static str {
    match mode {
        Mode::Report => "report",
        Mode::ListFields => "fields",
        Mode::ListUsers => "users",
    }
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    match args.color {
        ColorChoice::Always => {
            colored::control::set_override(true);
        }
        ColorChoice::Never => {
            colored::control::set_override(false);
        }
        ColorChoice::Auto => {}
    }
    if let Err(e) = verify_inputs(&args) {
        error!("{}", e);
        std::process::exit(2);
    }

    let config = match FilterConfig::new(
        args.exclude.clone(),
        args.include.clone(),
        args.include_all.clone(),
        args.level,
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(4);
        }
    };

    let registry = match load_registry(&args) {
        Ok(r) => r,
        Err(e) => {
            error!("failed to load registry: {:#}", e);
            std::process::exit(2);
        }
    };

    let mut engine = Engine::with_registry(registry);
    let threshold = if args.mmap_threshold == 0 {
        u64::MAX
    } else {
        args.mmap_threshold
    };
    if let Err(e) = engine.load_from_file_paths_with_threshold(&[&args.input], threshold) {
        error!("failed to load input: {:#}", e);
        std::process::exit(3);
    }

    for name in engine.unknown_fields(&config) {
        warn!(
            "field '{}' does not exist in the LDAP data and will be ignored",
            name
        );
    }

    let mode = args.mode();
    let report = engine.build_report(&config, mode);

    if !args.quiet {
        println!("{}", render_report(&report));
    }

    if let Some(outdir) = &args.output {
        if let Err(e) = fs::create_dir_all(outdir) {
            error!(
                "failed to create output directory {}: {}",
                outdir.display(),
                e
            );
            std::process::exit(5);
        }
        let ts = chrono::Local::now().format("%Y.%m.%d_%H.%M.%S");
        let csv = outdir.join(format!("ldapscout_{}_{}.csv", mode_slug(mode), ts));
        if let Err(e) = save_report_csv(&report, &csv) {
            error!("failed to write {}: {:#}", csv.display(), e);
            std::process::exit(6);
        }
        if !args.quiet {
            println!("{} {}", "Export written:".green(), csv.display());
        }
    }

    if args.log_parse_stats {
        if let Some(stats) = engine.parse_stats {
            log::info!(
                "parse stats: entries={}, skipped_blocks={}, comment_lines={}, continuation_lines={}, orphan_lines={}",
                stats.entries,
                stats.skipped_blocks,
                stats.comment_lines,
                stats.continuation_lines,
                stats.orphan_lines
            );
        } else {
            log::info!("parse stats: (not collected for this run)");
        }
    }
}
