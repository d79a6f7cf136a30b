use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use super::{
    config_store::ConfigStore,
    env_overrides::EnvOverrides,
    error::ConfiguratorError,
    handle::{ConfigReader, RuntimeConfigUpdater},
    patch::{resolve, Overlay as _, RuntimeConfigPatch, StartupConfigPatch},
    types::{ConfVars, RuntimeConfig, StartupConfig},
};

/// Live configuration shared between the configurator and its handles.
pub(crate) struct ConfigState {
    store: ConfigStore,
    conf_vars: RwLock<ConfVars>,
    // serializes read-modify-write of memory and disk
    update_lock: Mutex<()>,
}

impl ConfigState {
    pub(crate) fn conf_vars(&self) -> ConfVars {
        self.conf_vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn update_runtime_config(
        &self,
        patch: &RuntimeConfigPatch,
    ) -> Result<ConfVars, ConfiguratorError> {
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = self.conf_vars();
        next.runtime_config = next.runtime_config.overlay(patch);

        // publish only after the snapshot is on disk
        self.store.save(&next)?;
        *self
            .conf_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next.clone();
        log::info!("Runtime config updated");
        log::debug!("Runtime config patch: {:?}", patch);
        Ok(next)
    }
}

/// Owns the resolved configuration for the lifetime of the process.
///
/// Built once at startup from defaults, the saved snapshot and the
/// environment. Startup fields resolve as `env > saved > default`; runtime
/// fields as `saved > env > default`, so values adjusted while running survive
/// a restart even when stale environment variables are still set.
pub struct Configurator {
    state: Arc<ConfigState>,
    critical_change_detected: bool,
}

impl Configurator {
    pub fn new(store: ConfigStore, env: EnvOverrides) -> Result<Self, ConfiguratorError> {
        let (conf_vars, critical_change_detected) = if store.exists() {
            let saved = store.load()?;
            log::info!("Loaded saved config from {}", store.path().display());

            let critical_change_detected = rollup_address_changed(&saved.startup, &env.startup);
            if critical_change_detected {
                log::warn!(
                    "Rollup contract address changed from {} to {}",
                    saved.startup.rollup_contract_address,
                    env.startup
                        .rollup_contract_address
                        .unwrap_or(saved.startup.rollup_contract_address)
                );
            }

            let saved_startup = StartupConfigPatch::from(saved.startup);
            let saved_runtime = RuntimeConfigPatch::from(saved.runtime_config);
            let conf_vars = ConfVars {
                startup: resolve(StartupConfig::default(), &[&saved_startup, &env.startup]),
                runtime_config: resolve(
                    RuntimeConfig::default(),
                    &[&env.runtime, &saved_runtime],
                ),
            };
            (conf_vars, critical_change_detected)
        } else {
            log::info!(
                "No saved config at {}, starting from defaults",
                store.path().display()
            );
            let conf_vars = ConfVars {
                startup: resolve(StartupConfig::default(), &[&env.startup]),
                runtime_config: resolve(RuntimeConfig::default(), &[&env.runtime]),
            };
            (conf_vars, false)
        };

        // always re-save so the file reflects the resolved, normalized form
        store.save(&conf_vars)?;
        log::info!(
            "Config resolved: port {}, rollup contract {}, accepting txs {}, publish interval {}s",
            conf_vars.startup.port,
            conf_vars.startup.rollup_contract_address,
            conf_vars.runtime_config.accepting_txs,
            conf_vars.runtime_config.publish_interval,
        );

        Ok(Configurator {
            state: Arc::new(ConfigState {
                store,
                conf_vars: RwLock::new(conf_vars),
                update_lock: Mutex::new(()),
            }),
            critical_change_detected,
        })
    }

    /// Resolves against the snapshot at `path` and the process environment.
    pub fn from_env(path: impl Into<PathBuf>) -> Result<Self, ConfiguratorError> {
        let env = EnvOverrides::from_env()?;
        Self::new(ConfigStore::new(path), env)
    }

    pub fn conf_vars(&self) -> ConfVars {
        self.state.conf_vars()
    }

    pub fn critical_change_detected(&self) -> bool {
        self.critical_change_detected
    }

    /// Merges `patch` over the live runtime config and persists the result.
    /// On a failed save the live value is left unchanged.
    pub fn update_runtime_config(
        &self,
        patch: RuntimeConfigPatch,
    ) -> Result<ConfVars, ConfiguratorError> {
        self.state.update_runtime_config(&patch)
    }

    pub fn reader(&self) -> ConfigReader {
        ConfigReader::new(self.state.clone())
    }

    pub fn runtime_updater(&self) -> RuntimeConfigUpdater {
        RuntimeConfigUpdater::new(self.state.clone())
    }
}

fn rollup_address_changed(saved: &StartupConfig, env: &StartupConfigPatch) -> bool {
    match env.rollup_contract_address {
        Some(address) => address != saved.rollup_contract_address,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::*;

    fn saved_with_rollup(address: Address) -> StartupConfig {
        StartupConfig {
            rollup_contract_address: address,
            ..Default::default()
        }
    }

    #[test]
    fn test_rollup_address_changed() {
        let saved = saved_with_rollup(Address::repeat_byte(0xaa));

        let env = StartupConfigPatch {
            rollup_contract_address: Some(Address::repeat_byte(0xbb)),
            ..Default::default()
        };
        assert!(rollup_address_changed(&saved, &env));

        let env = StartupConfigPatch {
            rollup_contract_address: Some(Address::repeat_byte(0xaa)),
            ..Default::default()
        };
        assert!(!rollup_address_changed(&saved, &env));

        assert!(!rollup_address_changed(&saved, &StartupConfigPatch::default()));
    }

    #[test]
    fn test_failed_save_keeps_live_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let configurator =
            Configurator::new(ConfigStore::new(&path), EnvOverrides::default()).unwrap();
        let before = configurator.conf_vars();

        // a directory where the temp file should go makes the write fail
        std::fs::create_dir(dir.path().join("config.json.tmp")).unwrap();
        let result = configurator.update_runtime_config(RuntimeConfigPatch {
            flush_after_idle: Some(30),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(configurator.conf_vars(), before);
    }
}
