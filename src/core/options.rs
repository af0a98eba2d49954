//! Install options for the `opendaylight` Puppet class.

use anyhow::bail;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A package repository identifier, or the explicit `none` sentinel that tells
/// the Puppet class not to manage a repository of that flavor.
///
/// An empty identifier means the same thing as `none`: both deserialize to
/// [RepoId::None], and each repository field maps to the sentinel on its own,
/// independently of the other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum RepoId {
    #[default]
    None,
    Id(String),
}

impl RepoId {
    /// The repository identifier, if one is set.
    pub fn id(&self) -> Option<&str> {
        match self {
            RepoId::None => None,
            RepoId::Id(id) => Some(id),
        }
    }
}

impl From<String> for RepoId {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "none" => RepoId::None,
            _ => RepoId::Id(value),
        }
    }
}

impl From<&str> for RepoId {
    fn from(value: &str) -> Self {
        RepoId::from(value.to_string())
    }
}

impl From<RepoId> for String {
    fn from(value: RepoId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RepoId::None => write!(f, "none"),
            RepoId::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Fully resolved parameters for one OpenDaylight install.
///
/// Every field carries the default that the `opendaylight` Puppet class itself
/// uses, so deserializing an empty mapping (or calling [InstallOptions::default])
/// yields the configuration the class would apply with no arguments. Callers
/// override only the fields a scenario cares about.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InstallOptions {
    /// Yum repository to install from, or the `none` sentinel.
    pub rpm_repo: RepoId,

    /// Apt/PPA source to install from, or the `none` sentinel.
    pub deb_repo: RepoId,

    /// Karaf features booted by a stock install. Order is significant: the
    /// features config file lists them in exactly this order.
    pub default_features: Vec<String>,

    /// Extra Karaf features, appended after [Self::default_features].
    pub extra_features: Vec<String>,

    /// Port the REST API (jetty) listens on.
    pub odl_rest_port: u16,

    /// Custom logger verbosity, `logger name -> level`. Insertion order is
    /// preserved so failure diagnostics are reproducible run to run.
    pub log_levels: IndexMap<String, String>,

    /// Whether to configure OVSDB high availability.
    pub enable_ha: bool,

    /// Addresses of all HA cluster members. Must hold at least two entries
    /// when [Self::enable_ha] is set.
    pub ha_node_ips: Vec<String>,

    /// This node's position in [Self::ha_node_ips].
    pub ha_node_index: u32,

    /// REST API username.
    pub username: String,

    /// REST API password.
    pub password: String,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            rpm_repo: RepoId::None,
            deb_repo: RepoId::None,
            default_features: DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect(),
            extra_features: Vec::new(),
            odl_rest_port: 8080,
            log_levels: IndexMap::new(),
            enable_ha: false,
            ha_node_ips: Vec::new(),
            ha_node_index: 0,
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

/// Features booted by a stock install, in the order the class writes them.
pub const DEFAULT_FEATURES: [&str; 7] = [
    "config",
    "standard",
    "region",
    "package",
    "kar",
    "ssh",
    "management",
];

impl InstallOptions {
    /// Rejects option combinations that can never produce a working install.
    ///
    /// This runs before the manifest is rendered, so a bad combination costs
    /// nothing remote. Currently the only rule is the HA peer count: HA with
    /// fewer than two cluster members is not a cluster.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.enable_ha && self.ha_node_ips.len() < 2 {
            bail!(
                "HA is enabled but only {} HA node IP(s) were given; need at least 2",
                self.ha_node_ips.len()
            );
        }
        Ok(())
    }

    /// All features that should boot: defaults first, extras after, order
    /// preserved within each list.
    pub fn features(&self) -> Vec<String> {
        let mut features = self.default_features.clone();
        features.extend(self.extra_features.iter().cloned());
        features
    }

    /// The exact `featuresBoot=...` value the features config file must carry.
    pub fn features_boot(&self) -> String {
        self.features().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod repo_id {
        use super::*;

        #[test]
        fn empty_string_is_the_none_sentinel() {
            assert_eq!(RepoId::None, RepoId::from(""));
        }

        #[test]
        fn literal_none_is_the_none_sentinel() {
            assert_eq!(RepoId::None, RepoId::from("none"));
        }

        #[test]
        fn identifier_is_preserved() {
            let repo = RepoId::from("opendaylight-6-testing");
            assert_eq!(Some("opendaylight-6-testing"), repo.id());
            assert_eq!("opendaylight-6-testing", repo.to_string());
        }

        #[test]
        fn none_displays_as_none() {
            assert_eq!("none", RepoId::None.to_string());
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn match_the_puppet_class() {
            let options = InstallOptions::default();
            assert_eq!(RepoId::None, options.rpm_repo);
            assert_eq!(RepoId::None, options.deb_repo);
            assert_eq!(
                vec!["config", "standard", "region", "package", "kar", "ssh", "management"],
                options.default_features,
            );
            assert!(options.extra_features.is_empty());
            assert_eq!(8080, options.odl_rest_port);
            assert!(options.log_levels.is_empty());
            assert!(!options.enable_ha);
            assert!(options.ha_node_ips.is_empty());
            assert_eq!(0, options.ha_node_index);
            assert_eq!("admin", options.username);
            assert_eq!("admin", options.password);
        }

        #[test]
        fn empty_yaml_mapping_resolves_to_defaults() {
            let options: InstallOptions = serde_yaml::from_str("{}").unwrap();
            assert_eq!(InstallOptions::default(), options);
        }
    }

    mod validate {
        use super::*;

        #[test]
        fn accepts_defaults() {
            InstallOptions::default().validate().unwrap();
        }

        #[test]
        fn accepts_ha_with_two_peers() {
            let options = InstallOptions {
                enable_ha: true,
                ha_node_ips: vec!["10.0.0.1".into(), "10.0.0.2".into()],
                ..Default::default()
            };
            options.validate().unwrap();
        }

        #[test]
        fn rejects_ha_with_one_peer() {
            let options = InstallOptions {
                enable_ha: true,
                ha_node_ips: vec!["10.0.0.1".into()],
                ..Default::default()
            };
            assert!(options.validate().is_err());
        }

        #[test]
        fn rejects_ha_with_no_peers() {
            let options = InstallOptions {
                enable_ha: true,
                ..Default::default()
            };
            assert!(options.validate().is_err());
        }

        #[test]
        fn ignores_peer_list_when_ha_is_disabled() {
            let options = InstallOptions {
                enable_ha: false,
                ha_node_ips: vec!["10.0.0.1".into()],
                ..Default::default()
            };
            options.validate().unwrap();
        }
    }

    mod features {
        use super::*;

        #[test]
        fn extras_come_after_defaults() {
            let options = InstallOptions {
                default_features: vec!["config".into(), "standard".into()],
                extra_features: vec!["odl-netvirt-openstack".into()],
                ..Default::default()
            };
            assert_eq!(
                "config,standard,odl-netvirt-openstack",
                options.features_boot(),
            );
        }

        #[test]
        fn defaults_join_in_declared_order() {
            assert_eq!(
                "config,standard,region,package,kar,ssh,management",
                InstallOptions::default().features_boot(),
            );
        }
    }
}
