//! Verifies deserialization of Scenario and InstallOptions values from YAML.
//!
//! Scenario files are the crate's user-facing wire format, so the defaults
//! and sentinel handling are pinned down here rather than in unit tests.

use indexmap::IndexMap;
use odl_verify::core::{InstallOptions, RepoId};
use odl_verify::run_scenario::{load_scenarios, Scenario};
use std::io::Write;

#[test]
fn minimal_scenario_takes_all_option_defaults() {
    let yaml = "\
host: centos-7-host
os_tag: centos-7
";
    let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
    assert_eq!("centos-7-host", scenario.host);
    assert_eq!("centos-7", scenario.os_tag);
    assert_eq!(InstallOptions::default(), scenario.options);
}

#[test]
fn partial_options_override_only_the_named_fields() {
    let yaml = "\
host: centos-7-host
os_tag: centos-7
options:
  odl_rest_port: 9090
  extra_features:
    - odl-netvirt-openstack
";
    let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(9090, scenario.options.odl_rest_port);
    assert_eq!(vec!["odl-netvirt-openstack"], scenario.options.extra_features);
    // Everything else keeps its default.
    assert_eq!("admin", scenario.options.username);
    assert_eq!(
        InstallOptions::default().default_features,
        scenario.options.default_features,
    );
}

#[test]
fn empty_and_literal_none_repos_deserialize_to_the_sentinel() {
    let yaml = "\
host: h
os_tag: centos-7
options:
  rpm_repo: ''
  deb_repo: none
";
    let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(RepoId::None, scenario.options.rpm_repo);
    assert_eq!(RepoId::None, scenario.options.deb_repo);
}

#[test]
fn repo_identifiers_deserialize_verbatim() {
    let yaml = "\
host: h
os_tag: ubuntu-16
options:
  rpm_repo: opendaylight-62-release
  deb_repo: 'ppa:odl-team/carbon'
";
    let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(RepoId::Id("opendaylight-62-release".into()), scenario.options.rpm_repo);
    assert_eq!(RepoId::Id("ppa:odl-team/carbon".into()), scenario.options.deb_repo);
}

#[test]
fn log_levels_preserve_file_order() {
    let yaml = "\
host: h
os_tag: centos-7
options:
  log_levels:
    org.opendaylight.ovsdb: TRACE
    org.opendaylight.netvirt: DEBUG
    org.opendaylight.genius: INFO
";
    let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
    let keys: Vec<&String> = scenario.options.log_levels.keys().collect();
    assert_eq!(
        vec!["org.opendaylight.ovsdb", "org.opendaylight.netvirt", "org.opendaylight.genius"],
        keys,
    );
}

#[test]
fn ha_options_deserialize() {
    let yaml = "\
host: h
os_tag: centos-7
options:
  enable_ha: true
  ha_node_ips:
    - 10.0.0.1
    - 10.0.0.2
    - 10.0.0.3
  ha_node_index: 2
";
    let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
    assert!(scenario.options.enable_ha);
    assert_eq!(3, scenario.options.ha_node_ips.len());
    assert_eq!(2, scenario.options.ha_node_index);
    scenario.options.validate().unwrap();
}

#[test]
fn options_round_trip_through_yaml() {
    let mut log_levels = IndexMap::new();
    log_levels.insert("org.opendaylight.ovsdb".to_string(), "TRACE".to_string());
    let original = Scenario {
        host: "node1".to_string(),
        os_tag: "ubuntu-16".to_string(),
        options: InstallOptions {
            rpm_repo: RepoId::None,
            deb_repo: "ppa:odl-team/carbon".into(),
            odl_rest_port: 8181,
            log_levels,
            ..Default::default()
        },
    };

    let yaml = serde_yaml::to_string(&original).unwrap();
    let parsed: Scenario = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(original, parsed);
}

#[test]
fn load_scenarios_reads_a_yaml_sequence() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "\
- host: node1
  os_tag: centos-7
- host: node2
  os_tag: centos-7
  options:
    odl_rest_port: 9090
"
    )
    .unwrap();

    let scenarios = load_scenarios(file.path()).unwrap();
    assert_eq!(2, scenarios.len());
    assert_eq!("node1", scenarios[0].host);
    assert_eq!(8080, scenarios[0].options.odl_rest_port);
    assert_eq!(9090, scenarios[1].options.odl_rest_port);
}

#[test]
fn load_scenarios_reports_missing_files() {
    let error = load_scenarios("/nonexistent/scenarios.yaml").unwrap_err();
    assert!(error.to_string().contains("/nonexistent/scenarios.yaml"));
}
