use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use seafarer::config::{
    BlobStorageConfig, ParquetCompression, PipelineConfig, SinkPortConfig,
    SourcePortConfig,
};
use seafarer::pipeline::csv_to_parquet;

const ENDPOINT_FLAGS: [&str; 6] = [
    "source_connection",
    "source_container",
    "source_blob",
    "sink_connection",
    "sink_container",
    "sink_blob",
];

#[derive(Args)]
pub struct RunArgs {
    /// Path to a JSON pipeline config (replaces the source/sink flags)
    #[arg(long, conflicts_with_all = ENDPOINT_FLAGS)]
    config: Option<PathBuf>,

    /// Connection string of the source storage account
    #[arg(long, required_unless_present = "config")]
    source_connection: Option<String>,
    /// Container holding the CSV blob
    #[arg(long, required_unless_present = "config")]
    source_container: Option<String>,
    /// Path of the CSV blob inside the source container
    #[arg(long, required_unless_present = "config")]
    source_blob: Option<String>,

    /// Connection string of the sink storage account
    #[arg(long, required_unless_present = "config")]
    sink_connection: Option<String>,
    /// Container receiving the Parquet blob
    #[arg(long, required_unless_present = "config")]
    sink_container: Option<String>,
    /// Path of the Parquet blob inside the sink container
    #[arg(long, required_unless_present = "config")]
    sink_blob: Option<String>,

    /// Parquet compression (none, snappy, gzip, zstd)
    #[arg(long)]
    compression: Option<ParquetCompression>,
    /// CSV field delimiter
    #[arg(long)]
    delimiter: Option<char>,
    /// The CSV blob has no header row
    #[arg(long)]
    no_header: bool,
    /// Rows per decoded CSV batch
    #[arg(long)]
    batch_size: Option<usize>,
}

/// Execute the `run` command: build the pipeline, run it once, report the outcome.
pub fn execute(args: &RunArgs) -> ExitCode {
    println!("Starting Seafarer pipeline...");
    match run(args) {
        Ok(()) => {
            println!("Pipeline completed successfully!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Pipeline failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let config = pipeline_config(args)?;
    tracing::info!(
        source = %format_args!("{}/{}", config.source().blob_storage().container_name(), config.source().blob_path()),
        sink = %format_args!("{}/{}", config.sink().blob_storage().container_name(), config.sink().blob_path()),
        compression = %config.sink().compression(),
        "Pipeline configured"
    );

    let mut pipeline = csv_to_parquet(&config).context("connect ports")?;
    let report = pipeline.run()?;
    tracing::info!(
        items = report.items,
        elapsed_ms = report.elapsed.as_millis(),
        "Pipeline finished"
    );
    Ok(())
}

fn pipeline_config(args: &RunArgs) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("Failed to load pipeline config: {}", path.display()))?,
        None => from_flags(args)?,
    };

    let mut csv = *base.source().csv();
    if let Some(delimiter) = args.delimiter {
        csv = csv.with_delimiter(delimiter)?;
    }
    if args.no_header {
        csv = csv.with_header(false);
    }
    let source = base.source().clone().with_csv_options(csv);
    let sink = match args.compression {
        Some(compression) => base.sink().clone().with_compression(compression),
        None => base.sink().clone(),
    };
    let batch_size = args.batch_size.unwrap_or(base.batch_size());

    Ok(PipelineConfig::new(source, sink).with_batch_size(batch_size)?)
}

fn from_flags(args: &RunArgs) -> Result<PipelineConfig> {
    // clap enforces presence when --config is absent.
    let flag = |value: &Option<String>, name: &str| {
        value
            .clone()
            .with_context(|| format!("--{} is required without --config", name.replace('_', "-")))
    };

    let source_storage = BlobStorageConfig::from_connection_string(
        &flag(&args.source_connection, "source_connection")?,
        flag(&args.source_container, "source_container")?,
    )
    .context("invalid source storage")?;
    let sink_storage = BlobStorageConfig::from_connection_string(
        &flag(&args.sink_connection, "sink_connection")?,
        flag(&args.sink_container, "sink_container")?,
    )
    .context("invalid sink storage")?;

    let source = SourcePortConfig::new(source_storage, flag(&args.source_blob, "source_blob")?)?;
    let sink = SinkPortConfig::new(sink_storage, flag(&args.sink_blob, "sink_blob")?)?;
    Ok(PipelineConfig::new(source, sink))
}
