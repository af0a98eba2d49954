//! Types that describe an install scenario: options, host profile, rendered
//! manifest, and the collected validation report.

pub mod manifest;
pub mod options;
pub mod profile;
pub mod report;

#[doc(inline)]
pub use manifest::RenderedManifest;

#[doc(inline)]
pub use options::{InstallOptions, RepoId};

#[doc(inline)]
pub use profile::{HostProfile, OsFamily, PackagingFamily};

#[doc(inline)]
pub use report::{Check, ValidationReport};
