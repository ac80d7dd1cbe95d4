//! Resolves the effective [`StarfieldConfig`] from `--config` and `--params`.
//!
//! The config file is a JSON `StarfieldConfig` (missing fields take their
//! defaults); `--params` keys are layered on top of it.

use clap::Args;
use serde_json::Value;
use starfield_core::StarfieldConfig;
use std::fs;
use std::path::PathBuf;

use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// JSON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Parameter overrides as a JSON object.
    #[arg(long, default_value = "{}")]
    pub params: String,
}

impl ConfigArgs {
    /// Loads the file (if any), applies the overrides and validates.
    pub fn resolve(&self) -> Result<StarfieldConfig, CliError> {
        let base = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
                serde_json::from_str::<StarfieldConfig>(&text).map_err(|e| {
                    CliError::Input(format!("invalid config file {}: {e}", path.display()))
                })?
            }
            None => StarfieldConfig::default(),
        };

        let overrides: Value = serde_json::from_str(&self.params)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
        let Value::Object(overrides) = overrides else {
            return Err(CliError::Input("--params must be a JSON object".into()));
        };

        let mut merged = base.params();
        if let Value::Object(map) = &mut merged {
            map.extend(overrides);
        }
        Ok(StarfieldConfig::from_json(&merged)?)
    }
}
