//! Environment-derived scenario configuration.
//!
//! The repository identifiers and the host OS tag vary per CI run, not per
//! scenario, so they arrive through the environment. They are read once into
//! an immutable [EnvConfig] and injected into scenarios from there; nothing in
//! the pipeline reads the environment directly.

use crate::core::{InstallOptions, RepoId};
use crate::run_scenario::Scenario;
use anyhow::Context;
use std::env;

pub const RPM_REPO_VAR: &str = "ODL_RPM_REPO";
pub const DEB_REPO_VAR: &str = "ODL_DEB_REPO";
pub const OS_TAG_VAR: &str = "ODL_OS_TAG";

/// Per-run configuration from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub rpm_repo: RepoId,
    pub deb_repo: RepoId,

    /// Node-set tag naming the target OS, e.g. `centos-7-docker`.
    pub os_tag: String,
}

impl EnvConfig {
    /// Reads the configuration from the process environment.
    ///
    /// The OS tag is required. Each repository variable is optional and maps
    /// to the `none` sentinel on its own when unset or empty.
    pub fn from_env() -> anyhow::Result<Self> {
        let os_tag = env::var(OS_TAG_VAR)
            .with_context(|| format!("environment variable {OS_TAG_VAR} must name the host OS"))?;
        Ok(Self::from_values(
            env::var(RPM_REPO_VAR).unwrap_or_default(),
            env::var(DEB_REPO_VAR).unwrap_or_default(),
            os_tag,
        ))
    }

    /// Builds the configuration from already-read values.
    pub fn from_values(
        rpm_repo: impl Into<String>,
        deb_repo: impl Into<String>,
        os_tag: impl Into<String>,
    ) -> Self {
        EnvConfig {
            rpm_repo: RepoId::from(rpm_repo.into()),
            deb_repo: RepoId::from(deb_repo.into()),
            os_tag: os_tag.into(),
        }
    }

    /// Default install options carrying this run's repositories.
    pub fn options(&self) -> InstallOptions {
        InstallOptions {
            rpm_repo: self.rpm_repo.clone(),
            deb_repo: self.deb_repo.clone(),
            ..Default::default()
        }
    }

    /// An all-defaults scenario for `host` under this run's configuration.
    pub fn scenario(&self, host: impl Into<String>) -> Scenario {
        Scenario {
            host: host.into(),
            os_tag: self.os_tag.clone(),
            options: self.options(),
        }
    }
}
