//! Configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use wfm_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader that binds an ephemeral loopback port.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestConfigLoader;

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            listen_host: String::from("127.0.0.1"),
            listen_port: 0,
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing an invalid port.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("wfmd"),
            OsString::from("--listen-port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}
