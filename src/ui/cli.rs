use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// folder2vec - Sort loose text files into the closest-named directory
#[derive(Parser, Debug)]
#[command(name = "folder2vec")]
#[command(about = "Moves text files into the directory whose name best matches their content", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: config.yaml next to the executable)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which directory each file would move to, without moving anything
    Preview(RunArgs),
    /// Move each file into its best-matching directory
    Apply(RunArgs),
    /// Download the configured embedding model into the model directory
    FetchModel {
        /// HuggingFace model id (default: model_id from the config)
        #[arg(long)]
        model_id: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Root directory to scan
    pub root_path: PathBuf,
    /// Embed files in parallel
    #[arg(short, long)]
    pub parallel: bool,
}
