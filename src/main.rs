//! ckd-risk CLI - Main entry point.

use anyhow::Context;
use ckd_risk::api::ModelInfoResponse;
use ckd_risk::cli::{Cli, Commands};
use ckd_risk::compute::{ModelArtifact, RequestPayload};
use ckd_risk::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Serve {
            bind_addr,
            model_path,
            no_cors,
            metrics_addr,
        } => {
            // File config first, then flags and environment on top
            let mut config = match &cli.config {
                Some(path) => ServiceConfig::from_file(path)
                    .with_context(|| format!("loading config from {}", path.display()))?,
                None => ServiceConfig::default(),
            };

            if let Some(addr) = bind_addr {
                config.server.bind_addr = addr;
            }
            if let Some(path) = model_path {
                config.server.model_path = path;
            }
            if no_cors {
                config.server.cors_enabled = false;
            }
            if let Some(addr) = metrics_addr {
                config.observability.metrics_enabled = true;
                config.observability.metrics_addr = addr;
            }
            if let Some(level) = cli.log_level {
                config.observability.log_level = level;
            }

            ckd_risk::run(config).await?;
        }

        Commands::ModelInfo { path } => {
            let model = ModelArtifact::from_file(&path)?.into_model(&path)?;
            let info = ModelInfoResponse::from_model(&model);

            println!("{}", serde_json::to_string_pretty(&info)?);
            eprintln!(
                "version {} ({})",
                model.version,
                if model.capability.is_probabilistic() {
                    "probabilistic"
                } else {
                    "label only"
                }
            );
        }

        Commands::Predict { model, input } => {
            let loaded = ModelArtifact::from_file(&model)?.into_model(&model)?;

            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let payload: RequestPayload = serde_json::from_str(&raw)
                .with_context(|| format!("parsing patient record {}", input.display()))?;

            let assessment = ckd_risk::assessment::assess(&loaded, &payload)?;
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }

        Commands::Version => {
            println!("ckd-risk v{}", env!("CARGO_PKG_VERSION"));
            println!("Chronic kidney disease risk assessment service");
        }
    }

    Ok(())
}
