//! Configuration loading.
//!
//! Priority: CLI args > environment variables > config file > defaults.
//!
//! ```toml
//! # testpack.toml
//! pattern = "**/test/test*.js"
//! ignore = ["node_modules/**", "build/**"]
//! external = ["tape"]
//! ```

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::Serialize;
use testpack::BundleOptions;

use crate::cli::Cli;
use crate::error::{ConfigError, Result};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "testpack.toml";

/// Environment variable prefix (`TESTPACK_PATTERN`, `TESTPACK_OUT`, ...)
pub const ENV_PREFIX: &str = "TESTPACK_";

/// Options given on the command line. Unset fields don't override anything.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignore: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external: Vec<String>,
}

impl From<&Cli> for CliOverrides {
    fn from(args: &Cli) -> Self {
        Self {
            pattern: args.pattern.clone(),
            ignore: args.ignore.clone(),
            out: args.out.clone(),
            external: args.external.clone(),
        }
    }
}

/// Load bundle options from every source.
///
/// `cwd` is where `testpack.toml` is looked up when `--config` is not given.
pub fn load(args: &Cli, cwd: &Path) -> Result<BundleOptions> {
    let mut figment = Figment::new().merge(Serialized::defaults(BundleOptions::default()));

    let config_file = match &args.config {
        Some(path) => {
            let path = cwd.join(path);
            if !path.is_file() {
                return Err(ConfigError::NotFound(path).into());
            }
            Some(path)
        }
        None => {
            let default_path = cwd.join(CONFIG_FILE);
            default_path.is_file().then_some(default_path)
        }
    };

    if let Some(path) = config_file {
        tracing::debug!("loading config from {}", path.display());
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX));
    figment = figment.merge(Serialized::defaults(CliOverrides::from(args)));

    let options: BundleOptions = figment
        .extract()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    options.validate()?;

    Ok(options)
}
