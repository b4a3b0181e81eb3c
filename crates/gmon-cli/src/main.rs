use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gmon")]
#[command(about = "GOOSE link & stream monitor CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Offline anomaly pass over a decoded-records JSON file
    Analyze {
        /// Decoded records JSON (array of raw records)
        #[arg(long)]
        records: String,

        /// Layered config YAML paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Full link report (streams + reconciliation + anomalies) as JSON
    Report {
        /// Decoded records JSON (array of raw records)
        #[arg(long)]
        records: String,

        /// Engineered links YAML; overrides the config's links_file
        #[arg(long)]
        links: Option<String>,

        /// Layered config YAML paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> bay...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Analyze {
            records,
            config_paths,
        } => commands::analyze::run(&records, &config_paths),

        Commands::Report {
            records,
            links,
            config_paths,
        } => commands::report::run(&records, links.as_deref(), &config_paths),

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = gmon_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(())
        }
    }
}
