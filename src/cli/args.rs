use crate::processors::JoinMode;
use crate::utils::time::instant_arg;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eclipse-obs")]
#[command(about = "Surface temperature frames for the 2017 solar eclipse")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: ./eclipse-obs.{toml,yaml,json} if present]"
    )]
    pub config: Option<PathBuf>,
}

/// Frame sequence and output options shared by the frame commands
#[derive(Args, Debug, Clone, Default)]
pub struct FrameArgs {
    #[arg(long, value_parser = instant_arg, help = "First frame, UTC (YYYY-MM-DD HH:MM)")]
    pub start: Option<NaiveDateTime>,

    #[arg(long, value_parser = instant_arg, help = "Last frame, UTC (YYYY-MM-DD HH:MM)")]
    pub end: Option<NaiveDateTime>,

    #[arg(long, help = "Minutes between frames")]
    pub step_minutes: Option<i64>,

    #[arg(short, long, help = "Only keep rows for this station")]
    pub station: Option<String>,

    #[arg(long, help = "Drop rows missing location or value")]
    pub plottable_only: bool,

    #[arg(short, long, help = "Parquet compression (snappy, gzip, lz4, zstd, none)")]
    pub compression: Option<String>,

    #[arg(long, help = "Frame worker threads")]
    pub max_workers: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build temperature-change frames
    Deltas {
        #[arg(short, long, required = true, num_args = 1.., help = "Observation files")]
        input: Vec<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/temperature-change-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[command(flatten)]
        frames: FrameArgs,

        #[arg(long, help = "Lookback span in minutes")]
        span_minutes: Option<i64>,

        #[arg(long, help = "Window tolerance in minutes")]
        tolerance_minutes: Option<i64>,

        #[arg(long, help = "cartesian or latest-per-station")]
        join_mode: Option<JoinMode>,

        #[arg(long, default_value = "false")]
        validate_only: bool,
    },

    /// Build temperature snapshot frames
    Snapshots {
        #[arg(short, long, required = true, num_args = 1.., help = "Observation files")]
        input: Vec<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/temperature-snapshots-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[command(flatten)]
        frames: FrameArgs,

        #[arg(long, help = "Window tolerance in minutes")]
        tolerance_minutes: Option<i64>,
    },

    /// Check observation files without building frames
    Validate {
        #[arg(short, long, required = true, num_args = 1.., help = "Observation files")]
        input: Vec<PathBuf>,

        #[arg(long)]
        max_workers: Option<usize>,
    },

    /// Summarize a temperature-change Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(
            long,
            default_value = "0",
            help = "Maximum rows to analyze (0 = all rows)"
        )]
        analysis_limit: usize,

        #[arg(long, help = "Print statistics as JSON")]
        json: bool,
    },
}
