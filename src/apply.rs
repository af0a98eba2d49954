//! The provisioning-engine seam: one enforcement pass per scenario.

use crate::core::RenderedManifest;
use async_trait::async_trait;
#[cfg(feature = "openssh")]
use std::sync::Arc;

/// The result of one manifest apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub success: bool,

    /// Engine output, kept verbatim for the failure message.
    pub detail: String,
}

/// Applies a rendered manifest to the target host.
///
/// Implementations run exactly one enforcement pass per call. A second-apply
/// idempotence diff is deliberately not part of this contract; package-manager
/// cache noise makes that comparison unreliable on the distributions we
/// target.
#[async_trait]
pub trait ProvisioningEngine {
    /// Applies `manifest` and reports whether the engine succeeded.
    ///
    /// An `Err` means the engine could not be driven at all (e.g. the
    /// connection died). An unsuccessful [ApplyOutcome] means the engine ran
    /// and the apply failed.
    async fn apply(&mut self, manifest: &RenderedManifest) -> anyhow::Result<ApplyOutcome>;
}

/// Production [ProvisioningEngine]: `puppet apply` over SSH.
#[cfg(feature = "openssh")]
pub struct PuppetApply {
    session: Arc<openssh::Session>,
}

#[cfg(feature = "openssh")]
impl PuppetApply {
    pub fn new(session: Arc<openssh::Session>) -> Self {
        PuppetApply { session }
    }
}

#[cfg(feature = "openssh")]
#[async_trait]
impl ProvisioningEngine for PuppetApply {
    async fn apply(&mut self, manifest: &RenderedManifest) -> anyhow::Result<ApplyOutcome> {
        // --detailed-exitcodes: 0 = no changes, 2 = changes applied; everything
        // else is a failure.
        let output = self
            .session
            .command("puppet")
            .arg("apply")
            .arg("--detailed-exitcodes")
            .arg("-e")
            .arg(manifest.text())
            .output()
            .await?;

        let success = matches!(output.status.code(), Some(0) | Some(2));
        let mut detail = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            if !detail.is_empty() {
                detail.push('\n');
            }
            detail.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        Ok(ApplyOutcome { success, detail })
    }
}
