//! Runs install scenarios end to end: validate options, render, apply, check.

use crate::apply::ProvisioningEngine;
#[cfg(feature = "openssh")]
use crate::apply::PuppetApply;
use crate::core::{HostProfile, InstallOptions, RenderedManifest, ValidationReport};
use crate::inspect::HostInspector;
#[cfg(feature = "openssh")]
use crate::inspect::SshInspector;
use crate::validate;
use anyhow::{bail, Context};
use async_trait::async_trait;
#[cfg(feature = "openssh")]
use openssh::KnownHosts;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "openssh")]
use std::sync::Arc;

/// One host to verify and the options its manifest should carry.
///
/// Typically parsed from a YAML scenario file; see [load_scenarios].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Scenario {
    /// The target host, as an SSH destination.
    pub host: String,

    /// Node-set tag naming the host's OS, e.g. `centos-7`.
    pub os_tag: String,

    /// Install options. Omitted fields take the Puppet class defaults.
    #[serde(default)]
    pub options: InstallOptions,
}

/// Loads a YAML sequence of [Scenario]s from a file.
pub fn load_scenarios(path: impl AsRef<Path>) -> anyhow::Result<Vec<Scenario>> {
    let path = path.as_ref();
    let file = fs::File::open(path)
        .with_context(|| format!("could not open scenario file {}", path.display()))?;
    serde_yaml::from_reader(file)
        .with_context(|| format!("could not parse scenario file {}", path.display()))
}

/// Opens the remote seams for one host.
///
/// Production code uses [SshConnector]; tests provide fakes.
#[async_trait]
pub trait Connect<E: ProvisioningEngine, I: HostInspector> {
    async fn connect(&mut self, host: &str) -> anyhow::Result<(E, I)>;
}

/// Runs one scenario and returns the collected validation report.
///
/// Fatal conditions return `Err` and skip everything downstream of them:
/// invalid options and an unrecognized OS tag are caught before any remote
/// work, and an apply failure is caught before any validation. Once checks
/// start, individual failures are recorded in the report and never abort the
/// rest of the suite.
pub async fn run_scenario<E, I, C>(
    scenario: &Scenario,
    connector: &mut C,
) -> anyhow::Result<ValidationReport>
where
    E: ProvisioningEngine + Send,
    I: HostInspector + Send,
    C: Connect<E, I>,
{
    scenario.options.validate()?;
    let profile = HostProfile::from_tag(&scenario.os_tag)?;
    let manifest = RenderedManifest::render(&scenario.host, &scenario.options);

    let (mut engine, mut inspector) = connector.connect(&scenario.host).await?;

    let outcome = engine
        .apply(&manifest)
        .await
        .with_context(|| format!("could not drive the provisioning engine on {}", scenario.host))?;
    if !outcome.success {
        bail!("manifest apply failed on {}:\n{}", scenario.host, outcome.detail);
    }

    let mut report = ValidationReport::new();
    validate::validate_host(&profile, &scenario.options, &mut inspector, &mut report).await?;
    Ok(report)
}

/// Runs each scenario in turn and pairs every host with its outcome.
///
/// Scenarios touch only their own host's state, so one host's failure never
/// stops the others.
pub async fn run_scenarios<E, I, C>(
    scenarios: &[Scenario],
    connector: &mut C,
) -> Vec<(String, anyhow::Result<ValidationReport>)>
where
    E: ProvisioningEngine + Send,
    I: HostInspector + Send,
    C: Connect<E, I>,
{
    let mut outcomes = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let outcome = run_scenario(scenario, connector).await;
        outcomes.push((scenario.host.clone(), outcome));
    }
    outcomes
}

/// Production [Connect]: one SSH session per host, shared by the engine and
/// the inspector.
#[cfg(feature = "openssh")]
#[derive(Clone)]
pub struct SshConnector;

#[cfg(feature = "openssh")]
#[async_trait]
impl Connect<PuppetApply, SshInspector> for SshConnector {
    async fn connect(&mut self, host: &str) -> anyhow::Result<(PuppetApply, SshInspector)> {
        let session = Arc::new(openssh::Session::connect_mux(host, KnownHosts::Add).await?);
        Ok((
            PuppetApply::new(Arc::clone(&session)),
            SshInspector::new(session),
        ))
    }
}
