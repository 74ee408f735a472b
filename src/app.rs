use std::path::PathBuf;

use crate::cli::{Cli, OutputMode};
use crate::cluster::ClusterClient;
use crate::config::Config;
use crate::error::Result;
use crate::lifecycle::Lifecycle;

pub struct AppContext {
    pub config_path: PathBuf,
    pub config: Config,
    pub client: ClusterClient,
    pub output_mode: OutputMode,
}

impl AppContext {
    /// Context around a config already loaded from `cli.config`.
    pub fn new(cli: &Cli, config: Config) -> Result<Self> {
        Ok(Self {
            config_path: Config::resolve_path(cli.config.as_deref()),
            client: ClusterClient::from_config(&config)?,
            config,
            output_mode: cli.output_mode(),
        })
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle<'_, ClusterClient> {
        Lifecycle::new(&self.client, self.config.backup_repository.clone())
            .with_prefix(self.config.snapshot_prefix.clone())
    }
}
