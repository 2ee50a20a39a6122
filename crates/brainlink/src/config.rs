// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI/environment configuration: exactly one brain selector, the
//! credentials and recording path that go with it, and the ambient
//! logging knobs every collaborator shares.

use clap::Parser;
use url::Url;

use crate::driver::Mode;
use crate::error::{Error, Result};

/// Connects a simulator to a remote training or prediction backend.
#[derive(Debug, Parser)]
#[command(name = "brainlink", version, about)]
pub struct Config {
    /// Train against the named brain (latest unpublished version).
    #[arg(long, env = "BONSAI_TRAIN_BRAIN")]
    pub train_brain: Option<String>,

    /// Request predictions from the named brain.
    #[arg(long, env = "BONSAI_PREDICT_BRAIN")]
    pub predict_brain: Option<String>,

    /// Brain version to request predictions from. Required with
    /// `--predict-brain`.
    #[arg(long, env = "BONSAI_PREDICT_VERSION")]
    pub predict_version: Option<u32>,

    /// A fully-formed `ws[s]://` brain URL, bypassing brain-name
    /// resolution entirely.
    #[arg(long, env = "BONSAI_BRAIN_URL")]
    pub brain_url: Option<String>,

    /// Bearer credential sent as the `Authorization` header.
    #[arg(long, env = "BONSAI_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// Write a verbatim SEND/RECV transcript of the session to this path.
    #[arg(long, env = "BONSAI_RECORDING_FILE")]
    pub recording_file: Option<std::path::PathBuf>,

    /// Log format (json or text).
    #[arg(long, env = "BONSAI_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "BONSAI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Everything the transport loop needs, resolved and validated from
/// [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub url: Url,
    pub mode: Mode,
    pub access_key: String,
    pub recording_file: Option<std::path::PathBuf>,
}

impl Config {
    /// Validate mutually-exclusive brain selectors, require an access key,
    /// and compose the final `ws[s]://` URL — spec.md §6's CLI surface.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let selectors = [self.train_brain.is_some(), self.predict_brain.is_some(), self.brain_url.is_some()];
        let selected = selectors.iter().filter(|s| **s).count();
        if selected == 0 {
            return Err(Error::Config(
                "exactly one of --train-brain, --predict-brain, --brain-url is required".to_string(),
            ));
        }
        if selected > 1 {
            return Err(Error::Config(
                "--train-brain, --predict-brain, and --brain-url are mutually exclusive".to_string(),
            ));
        }
        if self.predict_brain.is_some() && self.predict_version.is_none() {
            return Err(Error::Config("--predict-version is required with --predict-brain".to_string()));
        }

        let access_key =
            self.access_key.clone().ok_or_else(|| Error::Config("--access-key is required".to_string()))?;

        let (url, mode) = self.resolve_url()?;

        Ok(ResolvedConfig { url, mode, access_key, recording_file: self.recording_file.clone() })
    }

    fn resolve_url(&self) -> Result<(Url, Mode)> {
        if let Some(raw) = &self.brain_url {
            let url = Url::parse(raw).map_err(|e| Error::Config(format!("invalid --brain-url: {e}")))?;
            let mode = mode_from_path(url.path())?;
            return Ok((url, mode));
        }
        if let Some(brain) = &self.train_brain {
            let raw = format!("wss://api.bons.ai/v1/{brain}/sims/ws");
            let url = Url::parse(&raw).map_err(|e| Error::Config(format!("invalid train brain URL: {e}")))?;
            return Ok((url, Mode::Training));
        }
        if let Some(brain) = &self.predict_brain {
            let version = self.predict_version.ok_or_else(|| {
                Error::Config("--predict-version is required with --predict-brain".to_string())
            })?;
            let raw = format!("wss://api.bons.ai/v1/{brain}/{version}/predictions/ws");
            let url = Url::parse(&raw).map_err(|e| Error::Config(format!("invalid predict brain URL: {e}")))?;
            return Ok((url, Mode::Prediction));
        }
        Err(Error::Config("exactly one of --train-brain, --predict-brain, --brain-url is required".to_string()))
    }
}

/// Infers [`Mode`] from the URL path suffix, per spec.md §6.
fn mode_from_path(path: &str) -> Result<Mode> {
    if path.ends_with("/sims/ws") {
        Ok(Mode::Training)
    } else if path.ends_with("/predictions/ws") {
        Ok(Mode::Prediction)
    } else {
        Err(Error::Config(format!("cannot infer mode from --brain-url path {path:?}")))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
