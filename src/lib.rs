//! Acceptance validation for Puppet-managed OpenDaylight installs.
//!
//! # What this crate does
//!
//! One *scenario* verifies one host. The pipeline is:
//!
//! 1. Resolve caller-supplied [InstallOptions], filling in the defaults that the
//!    `opendaylight` Puppet class uses. Invalid combinations (HA enabled with
//!    fewer than two peers) are rejected here, before any remote work.
//!
//! 2. Render a [RenderedManifest]: the `class { 'opendaylight': ... }` declaration
//!    for those options, built field by field with Puppet-literal quoting.
//!
//! 3. Apply the manifest on the target host, exactly once, through a
//!    [ProvisioningEngine]. An apply failure ends the scenario; no checks run.
//!
//! 4. Run the validation suite against the host through a [HostInspector]:
//!    filesystem, service, user/group, process, package, repository, Karaf
//!    feature list, REST port, log levels, and a credentialed reachability
//!    probe. Every check is collected into a [ValidationReport]; a failing
//!    check never hides the checks that follow it.
//!
//! Both remote seams are traits, so the whole pipeline runs against fakes in
//! tests. The production implementations ([PuppetApply], [SshInspector]) talk
//! to the host over SSH and are gated behind the `openssh` cargo feature.
//!
//! [InstallOptions]: core::InstallOptions
//! [RenderedManifest]: core::RenderedManifest
//! [ValidationReport]: core::ValidationReport
//! [ProvisioningEngine]: apply::ProvisioningEngine
//! [HostInspector]: inspect::HostInspector
//! [PuppetApply]: apply::PuppetApply
//! [SshInspector]: inspect::SshInspector

pub mod apply;
pub mod config;
pub mod core;
pub mod inspect;
pub mod run_scenario;
pub mod validate;

#[doc(inline)]
pub use run_scenario::{run_scenario, run_scenarios, Scenario};
