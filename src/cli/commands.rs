use crate::analyzers::FrameAnalyzer;
use crate::cli::args::{Cli, Commands, FrameArgs};
use crate::error::Result;
use crate::models::ObservationTable;
use crate::processors::{
    DeltaCalculator, FrameBuilder, FrameSequence, ObservationChecker, ObservationReport,
};
use crate::readers::ConcurrentReader;
use crate::settings::AppConfig;
use crate::utils::filename::{generate_default_delta_filename, generate_default_snapshot_filename};
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use validator::Validate;

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Deltas {
            input,
            output_file,
            frames,
            span_minutes,
            tolerance_minutes,
            join_mode,
            validate_only,
        } => {
            apply_frame_args(&mut settings, &frames);
            if let Some(span) = span_minutes {
                settings.span_minutes = span;
            }
            if let Some(tolerance) = tolerance_minutes {
                settings.tolerance_minutes = tolerance;
            }
            if let Some(mode) = join_mode {
                settings.join_mode = mode;
            }
            settings.validate()?;

            let output_file = output_file.unwrap_or_else(generate_default_delta_filename);
            let table = load_observations(&input, &settings, frames.station.as_deref()).await?;

            if validate_only {
                print_check_report(&table);
                println!("Validation complete - no output file written");
                return Ok(());
            }

            let sequence = frame_sequence(&settings)?;
            let calculator = DeltaCalculator::new(settings.span()?, settings.tolerance()?)?
                .with_join_mode(settings.join_mode);

            println!("Building temperature change frames...");
            println!(
                "Frames: {} to {} every {} min ({} frames)",
                sequence.start(),
                sequence.end(),
                settings.step_minutes,
                sequence.len()
            );
            println!(
                "Span: {} min, tolerance: {} min, join: {}",
                settings.span_minutes, settings.tolerance_minutes, settings.join_mode
            );

            let progress = ProgressReporter::new(sequence.len() as u64, "Computing deltas...", false);
            let mut delta_frames = FrameBuilder::new(sequence)
                .with_max_workers(settings.max_workers)
                .build_delta_frames(&table, &calculator, Some(&progress))?;
            progress.finish_with_message(&format!("Computed {} frames", delta_frames.len()));

            if frames.plottable_only {
                delta_frames.iter_mut().for_each(|f| f.retain_plottable());
            }

            let writer = ParquetWriter::new().with_compression(&settings.compression)?;
            create_parent_dir(&output_file)?;
            let rows = writer.write_delta_frames(&delta_frames, &output_file)?;
            info!(rows, path = %output_file.display(), "wrote temperature change frames");

            finish_output(&writer, &output_file, rows)?;
        }

        Commands::Snapshots {
            input,
            output_file,
            frames,
            tolerance_minutes,
        } => {
            apply_frame_args(&mut settings, &frames);
            if let Some(tolerance) = tolerance_minutes {
                settings.snapshot_tolerance_minutes = tolerance;
            }
            settings.validate()?;

            let output_file = output_file.unwrap_or_else(generate_default_snapshot_filename);
            let table = load_observations(&input, &settings, frames.station.as_deref()).await?;
            let sequence = frame_sequence(&settings)?;

            println!("Building temperature snapshot frames...");
            println!(
                "Frames: {} to {} every {} min ({} frames), tolerance: {} min",
                sequence.start(),
                sequence.end(),
                settings.step_minutes,
                sequence.len(),
                settings.snapshot_tolerance_minutes
            );

            let progress =
                ProgressReporter::new(sequence.len() as u64, "Selecting observations...", false);
            let mut snapshot_frames = FrameBuilder::new(sequence)
                .with_max_workers(settings.max_workers)
                .build_snapshot_frames(&table, settings.snapshot_tolerance()?, Some(&progress))?;
            progress.finish_with_message(&format!("Selected {} frames", snapshot_frames.len()));

            if frames.plottable_only {
                snapshot_frames.iter_mut().for_each(|f| f.retain_plottable());
            }

            let writer = ParquetWriter::new().with_compression(&settings.compression)?;
            create_parent_dir(&output_file)?;
            let rows = writer.write_snapshot_frames(&snapshot_frames, &output_file)?;
            info!(rows, path = %output_file.display(), "wrote snapshot frames");

            finish_output(&writer, &output_file, rows)?;
        }

        Commands::Validate { input, max_workers } => {
            if let Some(workers) = max_workers {
                settings.max_workers = workers;
            }
            settings.validate()?;

            println!("Validating observation data...");
            let table = load_observations(&input, &settings, None).await?;
            let report = print_check_report(&table);

            if report.duplicate_keys.is_empty() && report.missing_timestamps == 0 {
                println!("✅ All observations have unique station/time keys");
            } else {
                println!(
                    "⚠️  Found {} duplicate keys and {} rows without a timestamp",
                    report.duplicate_keys.len(),
                    report.missing_timestamps
                );
            }
        }

        Commands::Info {
            file,
            analysis_limit,
            json,
        } => {
            let analyzer = FrameAnalyzer::new();
            let stats = analyzer.analyze_parquet_with_limit(&file, analysis_limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!("Analyzing Parquet file: {}", file.display());
            println!("\n{}", stats.detailed_summary());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\nFile Details:");
            println!("{}", file_info.summary());
        }
    }

    Ok(())
}

/// Command-line flags override file and environment settings
fn apply_frame_args(settings: &mut AppConfig, frames: &FrameArgs) {
    if let Some(start) = frames.start {
        settings.start = start.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Some(end) = frames.end {
        settings.end = end.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Some(step) = frames.step_minutes {
        settings.step_minutes = step;
    }
    if let Some(compression) = &frames.compression {
        settings.compression = compression.clone();
    }
    if let Some(workers) = frames.max_workers {
        settings.max_workers = workers;
    }
}

fn frame_sequence(settings: &AppConfig) -> Result<FrameSequence> {
    FrameSequence::new(settings.start_time()?, settings.end_time()?, settings.step()?)
}

async fn load_observations(
    input: &[PathBuf],
    settings: &AppConfig,
    station: Option<&str>,
) -> Result<ObservationTable> {
    for path in input {
        println!("Input file: {}", path.display());
    }

    let progress = ProgressReporter::new_spinner("Reading observations...", false);
    let table = ConcurrentReader::new(settings.max_workers)
        .read_all(input)
        .await?;
    progress.finish_with_message(&format!("Read {} observations", table.len()));

    Ok(match station {
        Some(station) => table.for_station(station),
        None => table,
    })
}

fn print_check_report(table: &ObservationTable) -> ObservationReport {
    let checker = ObservationChecker::new();
    let report = checker.check(table);
    println!("\n{}", checker.generate_summary(&report));
    report
}

fn create_parent_dir(output_file: &Path) -> Result<()> {
    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn finish_output(writer: &ParquetWriter, output_file: &Path, rows: usize) -> Result<()> {
    if rows == 0 {
        println!("No rows to write - {} holds an empty table", output_file.display());
    }

    let file_info = writer.get_file_info(output_file)?;
    println!("\n{}", file_info.summary());
    println!("Output file: {}", output_file.display());
    println!("Processing complete!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frame_flags_override_loaded_settings() {
        let mut settings = AppConfig {
            step_minutes: 15,
            max_workers: 8,
            compression: "gzip".to_string(),
            ..AppConfig::default()
        };
        let start = NaiveDate::from_ymd_opt(2017, 8, 21)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        let frames = FrameArgs {
            start: Some(start),
            step_minutes: Some(5),
            max_workers: Some(3),
            ..FrameArgs::default()
        };

        apply_frame_args(&mut settings, &frames);

        assert_eq!(settings.start_time().unwrap(), start);
        assert_eq!(settings.step().unwrap(), Duration::minutes(5));
        assert_eq!(settings.max_workers, 3);
        // flags left unset keep the loaded values
        assert_eq!(settings.compression, "gzip");
        assert_eq!(settings.end, AppConfig::default().end);

        let sequence = frame_sequence(&settings).unwrap();
        assert_eq!(sequence.start(), start);
        assert_eq!(sequence.step(), Duration::minutes(5));
    }
}
