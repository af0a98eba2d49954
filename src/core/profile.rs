//! The target host's OS identity and everything that follows from it.

use anyhow::bail;

/// The OS families the `opendaylight` Puppet class supports.
///
/// This is a closed set on purpose: a host that is neither of these families
/// cannot be validated, and [HostProfile::from_tag] refuses it outright rather
/// than guessing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OsFamily {
    /// Modern Red Hat family (CentOS 7 and kin).
    RedHat,

    /// Ubuntu 16.04.
    Ubuntu16,
}

/// How the controller package reaches the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackagingFamily {
    Rpm,
    Deb,
}

/// Facts about a target host that the validation suite branches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostProfile {
    pub os_family: OsFamily,
}

impl HostProfile {
    /// Resolves a node-set tag (e.g. `centos-7-docker`) into a profile.
    ///
    /// Unknown tags are a fatal error: there is no sensible default branch for
    /// an OS we have no expectations about.
    pub fn from_tag(tag: &str) -> anyhow::Result<Self> {
        let os_family = match tag {
            "centos-7" | "centos-7-docker" => OsFamily::RedHat,
            "ubuntu-16" | "ubuntu-16-docker" => OsFamily::Ubuntu16,
            _ => bail!("unrecognized host OS tag: {tag:?}"),
        };
        Ok(HostProfile { os_family })
    }

    /// Where the distribution's packaging installs the systemd unit.
    pub fn service_unit_path(&self) -> &'static str {
        match self.os_family {
            OsFamily::RedHat => "/usr/lib/systemd/system/opendaylight.service",
            OsFamily::Ubuntu16 => "/lib/systemd/system/opendaylight.service",
        }
    }

    /// The Java 8 runtime package the controller depends on.
    pub fn java_package(&self) -> &'static str {
        match self.os_family {
            OsFamily::RedHat => "java-1.8.0-openjdk",
            OsFamily::Ubuntu16 => "openjdk-8-jre-headless",
        }
    }

    /// The packaging family the install came from.
    pub fn packaging(&self) -> PackagingFamily {
        match self.os_family {
            OsFamily::RedHat => PackagingFamily::Rpm,
            OsFamily::Ubuntu16 => PackagingFamily::Deb,
        }
    }
}
