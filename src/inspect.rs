//! The host-inspection seam: read-only probes of the target host's state.

use crate::core::PackagingFamily;
use async_trait::async_trait;
#[cfg(feature = "openssh")]
use std::sync::Arc;
use std::time::Duration;

/// What a path on the target host looks like.
///
/// A missing path reports `exists: false` and empty metadata fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileStatus {
    pub exists: bool,
    pub directory: bool,
    pub owner: String,
    pub group: String,

    /// Octal permission bits as printed by `stat`, e.g. `644`.
    pub mode: String,
}

impl FileStatus {
    /// Status of a path that does not exist.
    pub fn missing() -> Self {
        FileStatus::default()
    }
}

/// What a user account on the target host looks like.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub exists: bool,
    pub groups: Vec<String>,

    /// Home directory exactly as the passwd database records it. No trailing
    /// slash normalization: `/opt/opendaylight` and `/opt/opendaylight/` are
    /// different values here, and that difference has broken validation runs
    /// before.
    pub home: String,
}

impl UserInfo {
    pub fn missing() -> Self {
        UserInfo::default()
    }
}

/// Whether a package repository is known to the host and enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepoStatus {
    pub exists: bool,
    pub enabled: bool,
}

/// Read-only inspection primitives over one target host.
///
/// The validation suite is written entirely against this trait; the production
/// implementation ([SshInspector]) runs probe commands over SSH, and tests
/// substitute an in-memory fake.
#[async_trait]
pub trait HostInspector {
    async fn file_status(&mut self, path: &str) -> anyhow::Result<FileStatus>;

    /// Reads a file's content. An unreadable or missing file reads as empty;
    /// the paired [Self::file_status] check is responsible for reporting the
    /// real problem.
    async fn file_content(&mut self, path: &str) -> anyhow::Result<String>;

    /// Whether the service is enabled at boot.
    async fn service_enabled(&mut self, name: &str) -> anyhow::Result<bool>;

    /// Whether the service is currently running under the supervisor.
    async fn service_running(&mut self, name: &str) -> anyhow::Result<bool>;

    async fn user(&mut self, name: &str) -> anyhow::Result<UserInfo>;

    async fn group_exists(&mut self, name: &str) -> anyhow::Result<bool>;

    async fn package_installed(
        &mut self,
        family: PackagingFamily,
        name: &str,
    ) -> anyhow::Result<bool>;

    /// Whether a process with this exact name is running.
    async fn process_running(&mut self, name: &str) -> anyhow::Result<bool>;

    /// Yum repository status by repo id.
    async fn yum_repo(&mut self, id: &str) -> anyhow::Result<RepoStatus>;

    /// Apt source status by source identifier (a `ppa:owner/name` form is
    /// accepted and matched against the configured source lists).
    async fn apt_repo(&mut self, id: &str) -> anyhow::Result<RepoStatus>;

    /// Runs a shell command on the host and returns its exit code.
    async fn run_command(&mut self, command: &str) -> anyhow::Result<i32>;

    /// Waits between retries of a probe. Production sleeps; fakes return
    /// immediately so tests don't.
    async fn pause(&mut self, duration: Duration);
}

/// Production [HostInspector] over an SSH session.
#[cfg(feature = "openssh")]
pub struct SshInspector {
    session: Arc<openssh::Session>,
}

#[cfg(feature = "openssh")]
impl SshInspector {
    pub fn new(session: Arc<openssh::Session>) -> Self {
        SshInspector { session }
    }

    /// Runs `program` with `args` on the host. Arguments are passed through
    /// openssh, which shell-escapes each one.
    async fn output(
        &self,
        program: &str,
        args: &[&str],
    ) -> anyhow::Result<std::process::Output> {
        let mut command = self.session.command(program);
        for arg in args {
            command.arg(arg);
        }
        Ok(command.output().await?)
    }

    async fn exit_code(&self, program: &str, args: &[&str]) -> anyhow::Result<i32> {
        let output = self.output(program, args).await?;
        Ok(output.status.code().unwrap_or(-1))
    }
}

#[cfg(feature = "openssh")]
#[async_trait]
impl HostInspector for SshInspector {
    async fn file_status(&mut self, path: &str) -> anyhow::Result<FileStatus> {
        let output = self.output("stat", &["-c", "%F|%U|%G|%a", path]).await?;
        if !output.status.success() {
            return Ok(FileStatus::missing());
        }
        Ok(parse_stat(String::from_utf8_lossy(&output.stdout).trim()))
    }

    async fn file_content(&mut self, path: &str) -> anyhow::Result<String> {
        let output = self.output("cat", &[path]).await?;
        match output.status.success() {
            true => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            false => Ok(String::new()),
        }
    }

    async fn service_enabled(&mut self, name: &str) -> anyhow::Result<bool> {
        Ok(self.exit_code("systemctl", &["is-enabled", name]).await? == 0)
    }

    async fn service_running(&mut self, name: &str) -> anyhow::Result<bool> {
        Ok(self.exit_code("systemctl", &["is-active", name]).await? == 0)
    }

    async fn user(&mut self, name: &str) -> anyhow::Result<UserInfo> {
        let passwd = self.output("getent", &["passwd", name]).await?;
        if !passwd.status.success() {
            return Ok(UserInfo::missing());
        }
        let home = parse_passwd_home(String::from_utf8_lossy(&passwd.stdout).trim());

        let groups = self.output("id", &["-Gn", name]).await?;
        let groups = String::from_utf8_lossy(&groups.stdout)
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(UserInfo {
            exists: true,
            groups,
            home,
        })
    }

    async fn group_exists(&mut self, name: &str) -> anyhow::Result<bool> {
        Ok(self.exit_code("getent", &["group", name]).await? == 0)
    }

    async fn package_installed(
        &mut self,
        family: PackagingFamily,
        name: &str,
    ) -> anyhow::Result<bool> {
        match family {
            PackagingFamily::Rpm => Ok(self.exit_code("rpm", &["-q", name]).await? == 0),
            PackagingFamily::Deb => {
                let output = self
                    .output("dpkg-query", &["-W", "-f=${Status}", name])
                    .await?;
                let status = String::from_utf8_lossy(&output.stdout);
                Ok(output.status.success() && status.contains("install ok installed"))
            }
        }
    }

    async fn process_running(&mut self, name: &str) -> anyhow::Result<bool> {
        Ok(self.exit_code("pgrep", &["-x", name]).await? == 0)
    }

    async fn yum_repo(&mut self, id: &str) -> anyhow::Result<RepoStatus> {
        let output = self.output("yum", &["-q", "repolist", "all"]).await?;
        Ok(parse_yum_repolist(
            &String::from_utf8_lossy(&output.stdout),
            id,
        ))
    }

    async fn apt_repo(&mut self, id: &str) -> anyhow::Result<RepoStatus> {
        // The glob needs a shell; the command contains no caller data, the
        // identifier is matched locally.
        let output = self
            .output(
                "sh",
                &[
                    "-c",
                    "cat /etc/apt/sources.list /etc/apt/sources.list.d/*.list 2>/dev/null",
                ],
            )
            .await?;
        Ok(parse_apt_sources(
            &String::from_utf8_lossy(&output.stdout),
            id,
        ))
    }

    async fn run_command(&mut self, command: &str) -> anyhow::Result<i32> {
        self.exit_code("sh", &["-c", command]).await
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Parses one `stat -c '%F|%U|%G|%a'` line.
fn parse_stat(line: &str) -> FileStatus {
    let mut fields = line.splitn(4, '|');
    let file_type = fields.next().unwrap_or_default();
    FileStatus {
        exists: true,
        directory: file_type == "directory",
        owner: fields.next().unwrap_or_default().to_string(),
        group: fields.next().unwrap_or_default().to_string(),
        mode: fields.next().unwrap_or_default().to_string(),
    }
}

/// Extracts the home directory (sixth field) from a passwd entry.
fn parse_passwd_home(entry: &str) -> String {
    entry.split(':').nth(5).unwrap_or_default().to_string()
}

/// Finds a repo id in `yum repolist all` output.
///
/// Yum prints the repo id in the first column, sometimes suffixed with
/// `/releasever/arch` and sometimes prefixed with `!` for stale metadata.
fn parse_yum_repolist(output: &str, id: &str) -> RepoStatus {
    for line in output.lines() {
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        let first = first.trim_start_matches(['!', '*']);
        if first == id || first.starts_with(&format!("{id}/")) {
            return RepoStatus {
                exists: true,
                enabled: line.contains("enabled"),
            };
        }
    }
    RepoStatus::default()
}

/// Finds an apt source in concatenated sources.list content.
///
/// `id` may be a bare `owner/name` or the `ppa:owner/name` form; either way
/// the `owner/name` part is what appears in the deb line's URL.
fn parse_apt_sources(content: &str, id: &str) -> RepoStatus {
    let slug = id.strip_prefix("ppa:").unwrap_or(id);
    let mut status = RepoStatus::default();
    for line in content.lines() {
        if !line.contains(slug) {
            continue;
        }
        status.exists = true;
        if line.trim_start().starts_with("deb") {
            status.enabled = true;
        }
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_stat {
        use super::*;

        #[test]
        fn parses_a_directory() {
            let status = parse_stat("directory|odl|odl|775");
            assert!(status.exists);
            assert!(status.directory);
            assert_eq!("odl", status.owner);
            assert_eq!("odl", status.group);
            assert_eq!("775", status.mode);
        }

        #[test]
        fn parses_a_regular_file() {
            let status = parse_stat("regular file|root|root|644");
            assert!(status.exists);
            assert!(!status.directory);
            assert_eq!("644", status.mode);
        }
    }

    mod parse_passwd_home {
        use super::*;

        #[test]
        fn takes_the_sixth_field() {
            assert_eq!(
                "/opt/opendaylight",
                parse_passwd_home("odl:x:990:989:OpenDaylight:/opt/opendaylight:/sbin/nologin"),
            );
        }

        #[test]
        fn preserves_a_trailing_slash_exactly() {
            assert_eq!(
                "/opt/opendaylight/",
                parse_passwd_home("odl:x:990:989::/opt/opendaylight/:/sbin/nologin"),
            );
        }
    }

    mod parse_yum_repolist {
        use super::*;

        const OUTPUT: &str = "\
repo id                        repo name                          status
base/7/x86_64                  CentOS-7 - Base                    enabled: 10,072
opendaylight-62-release        CentOS CBS opendaylight-62-release enabled: 1
!updates/7/x86_64              CentOS-7 - Updates                 disabled
";

        #[test]
        fn finds_an_enabled_repo() {
            let status = parse_yum_repolist(OUTPUT, "opendaylight-62-release");
            assert!(status.exists);
            assert!(status.enabled);
        }

        #[test]
        fn matches_ids_with_releasever_suffix() {
            let status = parse_yum_repolist(OUTPUT, "base");
            assert!(status.exists);
            assert!(status.enabled);
        }

        #[test]
        fn reports_a_disabled_repo() {
            let status = parse_yum_repolist(OUTPUT, "updates");
            assert!(status.exists);
            assert!(!status.enabled);
        }

        #[test]
        fn reports_an_unknown_repo_as_missing() {
            assert_eq!(RepoStatus::default(), parse_yum_repolist(OUTPUT, "epel"));
        }
    }

    mod parse_apt_sources {
        use super::*;

        const CONTENT: &str = "\
deb http://ppa.launchpad.net/odl-team/carbon/ubuntu xenial main
# deb http://ppa.launchpad.net/odl-team/boron/ubuntu xenial main
";

        #[test]
        fn finds_an_enabled_source_with_ppa_prefix() {
            let status = parse_apt_sources(CONTENT, "ppa:odl-team/carbon");
            assert!(status.exists);
            assert!(status.enabled);
        }

        #[test]
        fn commented_source_exists_but_is_disabled() {
            let status = parse_apt_sources(CONTENT, "odl-team/boron");
            assert!(status.exists);
            assert!(!status.enabled);
        }

        #[test]
        fn unknown_source_is_missing() {
            assert_eq!(
                RepoStatus::default(),
                parse_apt_sources(CONTENT, "odl-team/nitrogen"),
            );
        }
    }
}
