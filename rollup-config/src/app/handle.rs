use std::sync::Arc;

use super::{
    configurator::ConfigState,
    error::ConfiguratorError,
    patch::RuntimeConfigPatch,
    types::{ConfVars, RuntimeConfig, StartupConfig},
};

/// Read-only view of the live configuration.
#[derive(Clone)]
pub struct ConfigReader {
    state: Arc<ConfigState>,
}

impl ConfigReader {
    pub(crate) fn new(state: Arc<ConfigState>) -> Self {
        Self { state }
    }

    pub fn conf_vars(&self) -> ConfVars {
        self.state.conf_vars()
    }

    pub fn startup_config(&self) -> StartupConfig {
        self.state.conf_vars().startup
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        self.state.conf_vars().runtime_config
    }
}

/// Handle for components that adjust the runtime partition while running.
#[derive(Clone)]
pub struct RuntimeConfigUpdater {
    state: Arc<ConfigState>,
}

impl RuntimeConfigUpdater {
    pub(crate) fn new(state: Arc<ConfigState>) -> Self {
        Self { state }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        self.state.conf_vars().runtime_config
    }

    pub fn update(&self, patch: RuntimeConfigPatch) -> Result<RuntimeConfig, ConfiguratorError> {
        let conf_vars = self.state.update_runtime_config(&patch)?;
        Ok(conf_vars.runtime_config)
    }

    /// Runs the update on the blocking pool so the disk write stays off the
    /// caller's task.
    pub async fn update_async(
        &self,
        patch: RuntimeConfigPatch,
    ) -> Result<RuntimeConfig, ConfiguratorError> {
        let state = self.state.clone();
        let conf_vars =
            tokio::task::spawn_blocking(move || state.update_runtime_config(&patch))
                .await
                .map_err(|e| ConfiguratorError::UpdateTaskError(e.to_string()))??;
        Ok(conf_vars.runtime_config)
    }
}
