//! The validation suite: every post-apply assertion about the target host.
//!
//! All checks append to a [ValidationReport] and never short-circuit one
//! another. The only aborts happen earlier in the pipeline: bad options and
//! unrecognized OS tags are rejected before apply, and an apply failure stops
//! the scenario before any of this runs.

use crate::core::{Check, HostProfile, InstallOptions, PackagingFamily, ValidationReport};
use crate::inspect::{FileStatus, HostInspector};
use regex::Regex;
use shlex::Quoter;
use std::time::Duration;

/// The controller's install directory.
pub const INSTALL_DIR: &str = "/opt/opendaylight/";

/// The odl user's home directory. Exact value, no trailing slash: the RPM sets
/// the home dir to `/opt/opendaylight`, and a trailing slash here makes the
/// comparison fail even though it names the same path.
pub const ODL_HOME: &str = "/opt/opendaylight";

/// Home directory that must NOT exist; packaging is not supposed to create it.
pub const UNEXPECTED_HOME: &str = "/home/odl";

pub const SERVICE: &str = "opendaylight";
pub const ODL_USER: &str = "odl";
pub const ODL_GROUP: &str = "odl";
pub const ODL_PACKAGE: &str = "opendaylight";
pub const JAVA_PROCESS: &str = "java";

pub const FEATURES_CFG: &str = "/opt/opendaylight/etc/org.apache.karaf.features.cfg";
pub const JETTY_CFG: &str = "/opt/opendaylight/etc/jetty.xml";
pub const LOGGING_CFG: &str = "/opt/opendaylight/etc/org.ops4j.pax.logging.cfg";
pub const IDMLIGHT_DB: &str = "/opt/opendaylight/idmlight.db.mv.db";

/// Comment the Puppet class writes above any custom log level entries.
pub const LOG_MARKER: &str = "# Log level config added by puppet-opendaylight";

/// The credentialed readiness probe target. The original helper hardcodes
/// port 8080 here regardless of the configured REST port; kept as-is for
/// compatibility.
pub const RESTCONF_URL: &str = "http://127.0.0.1:8080/restconf";

/// Readiness probing: up to 24 attempts, 5 s apart, 120 s overall.
const READINESS_ATTEMPTS: u32 = 24;
const READINESS_INTERVAL: Duration = Duration::from_secs(5);

/// Runs the whole validation suite for one host, appending to `report`.
///
/// `Err` means a probe could not be run at all (transport failure); an
/// assertion that merely fails is recorded in the report instead.
pub async fn validate_host<I: HostInspector>(
    profile: &HostProfile,
    options: &InstallOptions,
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    generic_checks(inspector, report).await?;
    os_family_checks(profile, inspector, report).await?;
    feature_checks(options, inspector, report).await?;
    port_checks(options, inspector, report).await?;
    log_level_checks(options, inspector, report).await?;
    packaging_checks(profile, options, inspector, report).await?;
    credential_checks(options, inspector, report).await?;
    Ok(())
}

/// Renders a [FileStatus] for check output.
fn kind(status: &FileStatus) -> &'static str {
    match (status.exists, status.directory) {
        (false, _) => "missing",
        (true, true) => "directory",
        (true, false) => "file",
    }
}

/// Checks that `path` is a regular file owned by odl:odl. Applies to each of
/// the controller's config files.
async fn config_file_checks<I: HostInspector>(
    inspector: &mut I,
    report: &mut ValidationReport,
    path: &str,
) -> anyhow::Result<()> {
    let status = inspector.file_status(path).await?;
    report.push(Check::eq(format!("{path} is a file"), "file", kind(&status)));
    report.push(Check::eq(format!("{path} owner"), ODL_USER, &status.owner));
    report.push(Check::eq(format!("{path} group"), ODL_GROUP, &status.group));
    Ok(())
}

/// Validations common to every option combination.
async fn generic_checks<I: HostInspector>(
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    let install_dir = inspector.file_status(INSTALL_DIR).await?;
    report.push(Check::eq("install directory", "directory", kind(&install_dir)));
    report.push(Check::eq("install directory owner", ODL_USER, &install_dir.owner));
    report.push(Check::eq("install directory group", ODL_GROUP, &install_dir.group));

    let enabled = inspector.service_enabled(SERVICE).await?;
    report.push(Check::eq(
        "opendaylight service enabled at boot",
        "enabled",
        if enabled { "enabled" } else { "disabled" },
    ));
    let running = inspector.service_running(SERVICE).await?;
    report.push(Check::eq(
        "opendaylight service running",
        "running",
        if running { "running" } else { "stopped" },
    ));

    // The odl user and group come from the RPM or deb, not the Puppet class.
    let user = inspector.user(ODL_USER).await?;
    report.push(Check::eq(
        "odl user",
        "exists",
        if user.exists { "exists" } else { "missing" },
    ));
    report.push(Check::eq(
        "odl user in odl group",
        "member",
        if user.groups.iter().any(|g| g == ODL_GROUP) {
            "member"
        } else {
            "not a member"
        },
    ));
    report.push(Check::eq("odl user home directory", ODL_HOME, &user.home));

    let group = inspector.group_exists(ODL_GROUP).await?;
    report.push(Check::eq(
        "odl group",
        "exists",
        if group { "exists" } else { "missing" },
    ));

    let stray_home = inspector.file_status(UNEXPECTED_HOME).await?;
    report.push(Check::new(
        "/home/odl not created",
        "no directory",
        kind(&stray_home),
        !stray_home.directory,
    ));

    // The controller shows up as a plain java process.
    let java = inspector.process_running(JAVA_PROCESS).await?;
    report.push(Check::eq(
        "java process running",
        "running",
        if java { "running" } else { "not running" },
    ));

    for path in [FEATURES_CFG, JETTY_CFG, LOGGING_CFG] {
        config_file_checks(inspector, report, path).await?;
    }
    Ok(())
}

/// Validations that branch on the host's OS family.
async fn os_family_checks<I: HostInspector>(
    profile: &HostProfile,
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    let unit_path = profile.service_unit_path();
    let unit = inspector.file_status(unit_path).await?;
    report.push(Check::eq(format!("{unit_path} is a file"), "file", kind(&unit)));
    report.push(Check::eq(format!("{unit_path} owner"), "root", &unit.owner));
    report.push(Check::eq(format!("{unit_path} group"), "root", &unit.group));
    report.push(Check::eq(format!("{unit_path} mode"), "644", &unit.mode));

    let java_package = profile.java_package();
    let installed = inspector
        .package_installed(profile.packaging(), java_package)
        .await?;
    report.push(Check::eq(
        format!("{java_package} package"),
        "installed",
        if installed { "installed" } else { "missing" },
    ));
    Ok(())
}

/// The features config file must boot defaults and extras in exactly the
/// configured order.
async fn feature_checks<I: HostInspector>(
    options: &InstallOptions,
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    let content = inspector.file_content(FEATURES_CFG).await?;
    let pattern = format!("(?m)^featuresBoot={}", regex::escape(&options.features_boot()));
    let matched = Regex::new(&pattern)?.is_match(&content);
    report.push(Check::content("featuresBoot line", &pattern, matched));
    Ok(())
}

/// The jetty config must carry the configured REST port.
async fn port_checks<I: HostInspector>(
    options: &InstallOptions,
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    let content = inspector.file_content(JETTY_CFG).await?;
    let pattern = format!(
        r#"Property name="jetty.port" default="{}""#,
        options.odl_rest_port,
    );
    report.push(Check::content(
        "jetty.port property",
        &pattern,
        content.contains(&pattern),
    ));
    Ok(())
}

/// Custom log levels are all-or-nothing: no configured levels means the
/// marker comment must be absent; any configured level means the marker must
/// be present along with one `log4j.logger` line per entry.
async fn log_level_checks<I: HostInspector>(
    options: &InstallOptions,
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    let content = inspector.file_content(LOGGING_CFG).await?;
    let marker_found = content.contains(LOG_MARKER);

    if options.log_levels.is_empty() {
        report.push(Check::content_absent(
            "custom log level marker",
            LOG_MARKER,
            marker_found,
        ));
        return Ok(());
    }

    report.push(Check::content("custom log level marker", LOG_MARKER, marker_found));
    for (logger, level) in &options.log_levels {
        let pattern = format!(
            "(?m)^log4j\\.logger\\.{} = {}",
            regex::escape(logger),
            regex::escape(level),
        );
        let matched = Regex::new(&pattern)?.is_match(&content);
        report.push(Check::content(format!("log level for {logger}"), &pattern, matched));
    }
    Ok(())
}

/// The packaging family's repository must be configured and the controller
/// package installed from it.
async fn packaging_checks<I: HostInspector>(
    profile: &HostProfile,
    options: &InstallOptions,
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    match profile.packaging() {
        PackagingFamily::Rpm => {
            if let Some(id) = options.rpm_repo.id() {
                let repo = inspector.yum_repo(id).await?;
                report.push(Check::eq(
                    format!("yum repository {id}"),
                    "exists",
                    if repo.exists { "exists" } else { "missing" },
                ));
                report.push(Check::eq(
                    format!("yum repository {id} enabled"),
                    "enabled",
                    if repo.enabled { "enabled" } else { "disabled" },
                ));
            }
        }
        PackagingFamily::Deb => {
            if let Some(id) = options.deb_repo.id() {
                let repo = inspector.apt_repo(id).await?;
                report.push(Check::eq(
                    format!("apt source {id}"),
                    "exists",
                    if repo.exists { "exists" } else { "missing" },
                ));
                report.push(Check::eq(
                    format!("apt source {id} enabled"),
                    "enabled",
                    if repo.enabled { "enabled" } else { "disabled" },
                ));
            }
        }
    }

    let installed = inspector
        .package_installed(profile.packaging(), ODL_PACKAGE)
        .await?;
    report.push(Check::eq(
        "opendaylight package",
        "installed",
        if installed { "installed" } else { "missing" },
    ));
    Ok(())
}

/// The identity store must exist and the REST API must answer a credentialed
/// request. The API comes up well after the service starts, so the probe
/// retries on an interval instead of sleeping a fixed minute up front.
async fn credential_checks<I: HostInspector>(
    options: &InstallOptions,
    inspector: &mut I,
    report: &mut ValidationReport,
) -> anyhow::Result<()> {
    let db = inspector.file_status(IDMLIGHT_DB).await?;
    report.push(Check::eq("idmlight database", "file", kind(&db)));

    let probe = readiness_probe(&options.username, &options.password);
    for attempt in 1..=READINESS_ATTEMPTS {
        if inspector.run_command(&probe).await? == 0 {
            report.push(Check::new(
                "restconf answers with configured credentials",
                "HTTP success",
                format!("success on attempt {attempt}"),
                true,
            ));
            return Ok(());
        }
        if attempt < READINESS_ATTEMPTS {
            inspector.pause(READINESS_INTERVAL).await;
        }
    }
    report.push(Check::new(
        "restconf answers with configured credentials",
        "HTTP success",
        format!(
            "no success within {READINESS_ATTEMPTS} attempts ({}s)",
            READINESS_ATTEMPTS as u64 * READINESS_INTERVAL.as_secs(),
        ),
        false,
    ));
    Ok(())
}

/// Builds the curl HEAD probe with the configured credentials quoted for the
/// remote shell.
fn readiness_probe(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    let components = [
        "curl",
        "-o",
        "/dev/null",
        "--fail",
        "--silent",
        "--head",
        "-u",
        credentials.as_str(),
        RESTCONF_URL,
    ];

    // Try to use shlex to properly quote the string. If that fails, naively join with spaces.
    match Quoter::new().join(components.iter().copied()) {
        Ok(s) => s,
        Err(_) => components.join(" "),
    }
}
