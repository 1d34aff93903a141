//! Command-line interface for the CKD risk service.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// ckd-risk - Chronic kidney disease risk assessment service.
#[derive(Parser)]
#[command(name = "ckd-risk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long, env = "CKD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CKD_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Bind address for the API
        #[arg(long, env = "CKD_BIND_ADDR")]
        bind_addr: Option<SocketAddr>,

        /// Model artifact path
        #[arg(long, env = "CKD_MODEL_PATH")]
        model_path: Option<PathBuf>,

        /// Disable CORS headers
        #[arg(long)]
        no_cors: bool,

        /// Serve Prometheus metrics on this address
        #[arg(long)]
        metrics_addr: Option<SocketAddr>,
    },

    /// Load a model artifact and describe it
    ModelInfo {
        /// Model artifact path
        path: PathBuf,
    },

    /// Assess a single patient record from a JSON file
    Predict {
        /// Model artifact path
        #[arg(short, long, env = "CKD_MODEL_PATH")]
        model: PathBuf,

        /// JSON file holding the patient record
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
