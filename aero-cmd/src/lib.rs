//! Command implementations for the Aero-Cast CLI.
//!
//! Provides subcommands that prepare raw station exports for the web apps
//! and render map and chart snapshots as standalone SVG files.

use aero_data::series::SeriesMode;
use clap::Subcommand;
use std::path::PathBuf;

pub mod files;
pub mod preprocess;
pub mod render;

#[derive(Subcommand)]
pub enum Command {
    /// Combine raw station exports into an hourly PM2.5 report
    CombineHourly {
        /// Input CSV files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Average PM2.5 per city, year and month
    MonthlyAverages {
        /// Input CSV files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// City name for every row, instead of the city column or file name
        #[arg(long)]
        city: Option<String>,
    },

    /// Concatenate CSV files under the union of their headers
    Combine {
        /// Directory holding the CSV files
        input_dir: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Add a source_file column naming each row's file
        #[arg(long)]
        include_filename: bool,
    },

    /// Render the drill-down map for a selection as SVG
    RenderMap {
        /// Daily combined CSVs, lowest merge priority first
        #[arg(short, long = "data", required = true)]
        data: Vec<PathBuf>,

        /// Output SVG path
        #[arg(short, long)]
        output: PathBuf,

        /// Base map GeoJSON
        #[arg(long, default_value = "fixtures/geo/SEA_Map.json")]
        base: PathBuf,

        /// Directory searched first for detail and province boundary files
        #[arg(long, default_value = "fixtures/geo")]
        geo_dir: PathBuf,

        /// Base URL searched when a boundary file is not found locally
        #[arg(long)]
        remote: Option<String>,

        /// Country to drill into, by name
        #[arg(long)]
        region: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        /// Month as YYYY-MM
        #[arg(long)]
        month: Option<String>,

        /// Day as YYYY-MM-DD
        #[arg(long)]
        day: Option<String>,

        /// Period slider position for the selected granularity
        #[arg(long, default_value_t = 0)]
        slot: usize,

        /// Overview timestamp position; defaults to the latest
        #[arg(long)]
        time: Option<usize>,
    },

    /// Render the dual-axis AOD / PM2.5 chart as SVG
    RenderChart {
        /// Monthly AOD CSV
        #[arg(long)]
        aod: Option<PathBuf>,

        /// Monthly PM2.5 CSV
        #[arg(long)]
        pm: Option<PathBuf>,

        /// Keep rows of this year (rows without a year are always kept)
        #[arg(long)]
        year: Option<i32>,

        /// aod, pm25 or both
        #[arg(long, default_value = "both")]
        mode: SeriesMode,

        /// Output SVG path
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::CombineHourly { inputs, output } => preprocess::run_combine_hourly(&inputs, &output),
        Command::MonthlyAverages {
            inputs,
            output,
            city,
        } => preprocess::run_monthly_averages(&inputs, &output, city.as_deref()),
        Command::Combine {
            input_dir,
            output,
            recursive,
            include_filename,
        } => preprocess::run_combine(&input_dir, &output, recursive, include_filename),
        Command::RenderMap {
            data,
            output,
            base,
            geo_dir,
            remote,
            region,
            year,
            month,
            day,
            slot,
            time,
        } => {
            let request = render::MapRequest {
                data,
                base,
                geo_dir,
                remote,
                region,
                year,
                month,
                day,
                slot,
                time,
            };
            render::run_render_map(&request, &output).await
        }
        Command::RenderChart {
            aod,
            pm,
            year,
            mode,
            output,
        } => render::run_render_chart(aod.as_deref(), pm.as_deref(), year, mode, &output),
    }
}
