mod export;
mod upload;

use anyhow::Result;
use battlemap_core::config::PipelineConfig;
use battlemap_core::facets::{distinct_participant_names, map_counts};
use battlemap_core::file_utils::collect_input_files;
use battlemap_core::filter::{
    matching, parse_source_timestamp, DateRange, ParticipantKindFilter, RewardRange,
};
use battlemap_core::{counts, BoundsPolicy, FilterSpec};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "battlemap",
    version = "0.1.0",
    about = "CLI tool for validating and filtering battle telemetry uploads",
    long_about = None
)]
struct Cli {
    /// Path to pipeline configuration TOML
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to log file
    #[arg(long, global = true, default_value = "/tmp/battlemap.log")]
    log_file: PathBuf,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate upload files and report which records failed
    Validate {
        /// JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Records validated per chunk
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Accept out-of-map coordinates and only warn about them
        #[arg(long, default_value_t = false)]
        soft_bounds: bool,
        /// Quiet mode (0=show messages/warnings, 1=suppress messages, 2=suppress both)
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// Filter valid records and export the matches
    Filter {
        /// JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
        /// Write matching records as JSON
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write matching records as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Quiet mode
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// List map ids and participant names found in valid records
    Facets {
        /// JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Quiet mode
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },
}

/// Filter flags. Each one overrides the matching `[filter]` config entry.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Exact map id
    #[arg(long)]
    map_id: Option<i64>,
    /// Participant name (repeatable, any one must be present)
    #[arg(long = "name")]
    names: Vec<String>,
    /// Case-insensitive substring of any participant name
    #[arg(long)]
    name_contains: Option<String>,
    #[arg(long)]
    min_exp: Option<i64>,
    #[arg(long)]
    max_exp: Option<i64>,
    #[arg(long)]
    min_gold: Option<i64>,
    #[arg(long)]
    max_gold: Option<i64>,
    #[arg(long)]
    min_x: Option<i64>,
    #[arg(long)]
    max_x: Option<i64>,
    #[arg(long)]
    min_y: Option<i64>,
    #[arg(long)]
    max_y: Option<i64>,
    /// Drop battles with at least one player
    #[arg(long, default_value_t = false)]
    no_players: bool,
    /// Drop battles without any player
    #[arg(long, default_value_t = false)]
    no_monsters: bool,
    /// Only event (true) or non-event (false) battles
    #[arg(long)]
    event: Option<bool>,
    /// Earliest source timestamp (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
    #[arg(long, value_parser = parse_start)]
    from: Option<NaiveDateTime>,
    /// Latest source timestamp; a bare date covers the whole day
    #[arg(long, value_parser = parse_end)]
    to: Option<NaiveDateTime>,
}

fn parse_start(s: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_source_timestamp(s).ok_or_else(|| format!("invalid date: {s}"))
}

fn parse_end(s: &str) -> std::result::Result<NaiveDateTime, String> {
    let at = parse_start(s)?;
    if s.trim().len() == "YYYY-MM-DD".len() {
        return Ok(at.date().and_hms_opt(23, 59, 59).unwrap_or(at));
    }
    Ok(at)
}

fn merge(slot: &mut Option<i64>, value: Option<i64>) {
    if value.is_some() {
        *slot = value;
    }
}

impl FilterArgs {
    fn apply_to(&self, spec: &mut FilterSpec) {
        if self.map_id.is_some() {
            spec.map_id = self.map_id;
        }
        if self.event.is_some() {
            spec.is_event = self.event;
        }
        if !self.names.is_empty() {
            spec.participant_names_any_of = Some(self.names.iter().cloned().collect());
        }
        if self.name_contains.is_some() {
            spec.participant_name_contains = self.name_contains.clone();
        }

        let reward = [self.min_exp, self.max_exp, self.min_gold, self.max_gold];
        if reward.iter().any(Option::is_some) {
            let range = spec.reward_range.get_or_insert_with(RewardRange::default);
            merge(&mut range.min_exp, self.min_exp);
            merge(&mut range.max_exp, self.max_exp);
            merge(&mut range.min_gold, self.min_gold);
            merge(&mut range.max_gold, self.max_gold);
        }

        let coords = [self.min_x, self.max_x, self.min_y, self.max_y];
        if coords.iter().any(Option::is_some) {
            let bounds = spec.coordinate_box.get_or_insert_with(Default::default);
            merge(&mut bounds.min_x, self.min_x);
            merge(&mut bounds.max_x, self.max_x);
            merge(&mut bounds.min_y, self.min_y);
            merge(&mut bounds.max_y, self.max_y);
        }

        if self.no_players || self.no_monsters {
            spec.participant_kind = Some(ParticipantKindFilter {
                include_player_battles: !self.no_players,
                include_monster_battles: !self.no_monsters,
            });
        }

        if self.from.is_some() || self.to.is_some() {
            let range = spec.source_date_range.get_or_insert_with(DateRange::default);
            if self.from.is_some() {
                range.start = self.from;
            }
            if self.to.is_some() {
                range.end = self.to;
            }
        }
    }
}

fn setup_logging(verbose: u8, log_file: &std::path::Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(std::path::Path::new(".")),
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("battlemap.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

fn interrupted_notice(outcome: &upload::UploadOutcome) -> String {
    let mut notice = String::from("interrupted: results cover completed chunks only");
    if !outcome.skipped.is_empty() {
        let skipped: Vec<String> = outcome
            .skipped
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        notice.push_str(&format!("; not loaded: {}", skipped.join(", ")));
    }
    notice
}

fn print_interrupted(outcome: &upload::UploadOutcome) {
    println!("{}", interrupted_notice(outcome));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(cli.verbose, &cli.log_file)?;

    info!("Starting battlemap CLI");

    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Pipeline config not found: {:?}", path);
            }
            PipelineConfig::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load pipeline config: {}", e))?
        }
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Validate { paths, chunk_size, soft_bounds, quiet } => {
            if let Some(chunk_size) = chunk_size {
                if chunk_size == 0 {
                    anyhow::bail!("--chunk-size must be at least 1");
                }
                config.ingest.chunk_size = chunk_size;
            }
            if soft_bounds {
                config.ingest.bounds = BoundsPolicy::Warn;
            }

            let files = collect_input_files(&paths, "json")?;
            if quiet == 0 {
                info!("Found {} upload files", files.len());
            }

            let outcome = upload::load_files(&files, &config.ingest, quiet).await;
            let summary = outcome.summary(config.ingest.max_reported_reasons);

            println!("{}", summary);
            for reason in &summary.reasons {
                println!("  {}", reason);
            }
            for (path, error) in &outcome.failures {
                println!("  {}: {}", path.display(), error);
            }
            if summary.out_of_bounds > 0 && config.ingest.bounds == BoundsPolicy::Warn {
                println!(
                    "warning: {} records lie outside the {}x{} map",
                    summary.out_of_bounds,
                    battlemap_core::models::MAP_WIDTH,
                    battlemap_core::models::MAP_HEIGHT
                );
            }
            if outcome.was_cancelled() {
                print_interrupted(&outcome);
            }
        }
        Commands::Filter { paths, filter, output, csv, quiet } => {
            filter.apply_to(&mut config.filter);
            let spec = config.filter;

            let files = collect_input_files(&paths, "json")?;
            let outcome = upload::load_files(&files, &config.ingest, quiet).await;
            if quiet < 2 && !outcome.failures.is_empty() {
                tracing::warn!("{} files could not be loaded", outcome.failures.len());
            }
            let interrupted = outcome.was_cancelled();
            if interrupted {
                print_interrupted(&outcome);
            }
            let records = outcome.into_records();

            let matched: Vec<_> = matching(&records, &spec).collect();
            let tally = counts(&records, &spec);
            println!("{} of {} records match", tally.matched, tally.total);

            if interrupted && (output.is_some() || csv.is_some()) {
                anyhow::bail!("Load was interrupted; not writing exports from partial data");
            }

            if let Some(path) = output {
                export::write_json(&path, &matched).await?;
                if quiet == 0 {
                    info!("Wrote {} records to {:?}", matched.len(), path);
                }
            }
            if let Some(path) = csv {
                export::write_csv(&path, &matched)?;
                if quiet == 0 {
                    info!("Wrote {} rows to {:?}", matched.len(), path);
                }
            }
        }
        Commands::Facets { paths, quiet } => {
            let files = collect_input_files(&paths, "json")?;
            let outcome = upload::load_files(&files, &config.ingest, quiet).await;
            if outcome.was_cancelled() {
                print_interrupted(&outcome);
            }
            let records = outcome.into_records();

            let map_ids: Vec<String> = map_counts(&records)
                .iter()
                .map(|(map_id, count)| format!("{} ({})", map_id, count))
                .collect();
            println!("maps: {}", map_ids.join(", "));
            println!("participants: {}", distinct_participant_names(&records).join(", "));
        }
    }

    info!("battlemap CLI finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_override_config() {
        let mut spec = PipelineConfig::from_str(
            "[filter]\nmap_id = 5\n[filter.reward_range]\nmin_exp = 10\nmax_exp = 500\n",
        )
        .unwrap()
        .filter;
        let args = FilterArgs {
            map_id: Some(7),
            names: vec!["Grute".to_string()],
            max_exp: Some(100),
            min_x: Some(0),
            no_monsters: true,
            ..Default::default()
        };
        args.apply_to(&mut spec);

        assert_eq!(spec.map_id, Some(7));
        let range = spec.reward_range.unwrap();
        assert_eq!((range.min_exp, range.max_exp), (Some(10), Some(100)));
        assert_eq!(spec.coordinate_box.unwrap().min_x, Some(0));
        assert_eq!(spec.participant_names_any_of.unwrap().len(), 1);
        let kind = spec.participant_kind.unwrap();
        assert!(kind.include_player_battles);
        assert!(!kind.include_monster_battles);
    }

    #[test]
    fn test_empty_args_leave_spec_alone() {
        let mut spec = FilterSpec::default();
        FilterArgs::default().apply_to(&mut spec);
        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn test_date_bounds() {
        let start = parse_start("2024-05-01").unwrap();
        let end = parse_end("2024-05-01").unwrap();
        assert_eq!(start.to_string(), "2024-05-01 00:00:00");
        assert_eq!(end.to_string(), "2024-05-01 23:59:59");
        assert_eq!(parse_end("2024-05-01 08:30:00").unwrap().to_string(), "2024-05-01 08:30:00");
        assert!(parse_start("yesterday").is_err());
    }

    #[test]
    fn test_interrupted_notice_names_skipped_files() {
        let outcome = upload::UploadOutcome {
            skipped: vec![PathBuf::from("b.json"), PathBuf::from("c.json")],
            interrupted: true,
            ..Default::default()
        };
        assert_eq!(
            interrupted_notice(&outcome),
            "interrupted: results cover completed chunks only; not loaded: b.json, c.json"
        );

        let partial = upload::UploadOutcome {
            interrupted: true,
            ..Default::default()
        };
        assert_eq!(
            interrupted_notice(&partial),
            "interrupted: results cover completed chunks only"
        );
    }

    #[test]
    fn test_cli_parses_filter_command() {
        let cli = Cli::try_parse_from([
            "battlemap", "filter", "uploads", "--map-id", "5", "--name", "A", "--name", "B",
            "--no-players", "--from", "2024-05-01", "--event", "true",
        ])
        .unwrap();
        let Commands::Filter { paths, filter, .. } = cli.command else {
            panic!("expected filter command");
        };
        assert_eq!(paths, vec![PathBuf::from("uploads")]);
        assert_eq!(filter.map_id, Some(5));
        assert_eq!(filter.names, vec!["A", "B"]);
        assert!(filter.no_players);
        assert_eq!(filter.event, Some(true));
        assert!(filter.from.is_some());
    }
}
