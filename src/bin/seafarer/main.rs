mod commands;
mod logging;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "seafarer",
    version,
    about = "Convert a CSV blob into a Parquet blob"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a CSV blob, write it back as Parquet
    Run(commands::run::RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run(args) => commands::run::execute(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const FLAGS: [&str; 13] = [
        "seafarer",
        "run",
        "--source-connection",
        "AccountName=dev;AccountKey=a2V5;BlobEndpoint=memory://cli;",
        "--source-container",
        "input",
        "--source-blob",
        "in.csv",
        "--sink-connection",
        "AccountName=dev;AccountKey=a2V5;BlobEndpoint=memory://cli;",
        "--sink-container",
        "output",
        "--sink-blob",
    ];

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_endpoint_flags() {
        let args = FLAGS.iter().copied().chain(["out.parquet", "--compression", "zstd"]);
        assert!(Cli::try_parse_from(args).is_ok());
    }

    #[test]
    fn run_requires_config_or_all_endpoint_flags() {
        assert!(Cli::try_parse_from(["seafarer", "run"]).is_err());
        assert!(Cli::try_parse_from(["seafarer", "run", "--config", "p.json"]).is_ok());
        let both = FLAGS.iter().copied().chain(["out.parquet", "--config", "p.json"]);
        assert!(Cli::try_parse_from(both).is_err());
    }

    #[test]
    fn run_rejects_unknown_compression() {
        let args = FLAGS.iter().copied().chain(["out.parquet", "--compression", "lz4"]);
        assert!(Cli::try_parse_from(args).is_err());
    }
}
