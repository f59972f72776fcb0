use std::{fs, path::Path};

use anyhow::Context as _;
use graphql_cost::CostControlConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub cost_control: CostControlConfig,
}

/// Reads the configuration file, if there is one.
pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;

    toml::from_str(&content).with_context(|| format!("invalid configuration in {}", path.display()))
}
