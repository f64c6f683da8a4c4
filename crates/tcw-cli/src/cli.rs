use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tcw_types::{ProjectMode, PromptKind};

#[derive(Parser)]
#[command(
    name = "tcw",
    about = "Transcript Workbench: compare, merge and finalize machine transcriptions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server URL, overriding the configuration
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two transcriptions line by line
    Diff(DiffArgs),
    /// Run recognition on page images
    Recognize(RecognizeArgs),
    /// Generate the final structured document
    Generate(GenerateArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub left: PathBuf,
    pub right: PathBuf,
}

#[derive(Args)]
pub struct RecognizeArgs {
    /// Page images, in page order
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
    /// Handwriting recognition model id
    #[arg(long)]
    pub htr_model: Option<u64>,
    #[arg(long)]
    pub llm_model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub mode: Option<ProjectMode>,
    /// Write every text variant of every page into this directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Page images, in page order
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
    /// Corrected text, one file per image
    #[arg(short, long = "text", required = true)]
    pub texts: Vec<PathBuf>,
    #[arg(long)]
    pub prompt: Option<PromptKind>,
    #[arg(long)]
    pub custom_prompt: Option<String>,
    #[arg(long)]
    pub llm_model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub mode: Option<ProjectMode>,
    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Also write the plain-text companion here
    #[arg(long)]
    pub plain_out: Option<PathBuf>,
}
