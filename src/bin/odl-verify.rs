//! Runs install scenarios against real hosts over SSH.
//!
//! Two invocation forms:
//!
//! ```text
//! odl-verify <scenario.yaml>...
//! odl-verify --env <host>...
//! ```
//!
//! The first loads YAML scenario files. The second builds an all-defaults
//! scenario per host from the `ODL_OS_TAG`, `ODL_RPM_REPO`, and `ODL_DEB_REPO`
//! environment variables, which is how CI drives a node set.

use anyhow::bail;
use odl_verify::config::EnvConfig;
use odl_verify::run_scenario::{load_scenarios, run_scenarios, Scenario, SshConnector};
use std::env;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("odl-verify: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<bool> {
    let args: Vec<String> = env::args().skip(1).collect();
    let scenarios = scenarios_from_args(&args)?;

    let mut connector = SshConnector;
    let outcomes = run_scenarios(&scenarios, &mut connector).await;

    let mut all_passed = true;
    for (host, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                println!("[{host}]\n{report}\n");
                if !report.passed() {
                    all_passed = false;
                }
            }
            Err(error) => {
                eprintln!("[{host}] scenario aborted: {error:#}");
                all_passed = false;
            }
        }
    }
    Ok(all_passed)
}

fn scenarios_from_args(args: &[String]) -> anyhow::Result<Vec<Scenario>> {
    match args.split_first() {
        None => bail!("usage: odl-verify <scenario.yaml>... | odl-verify --env <host>..."),
        Some((first, hosts)) if first == "--env" => {
            if hosts.is_empty() {
                bail!("--env requires at least one host");
            }
            let config = EnvConfig::from_env()?;
            Ok(hosts.iter().map(|host| config.scenario(host)).collect())
        }
        Some(_) => {
            let mut scenarios = Vec::new();
            for file in args {
                scenarios.extend(load_scenarios(file)?);
            }
            Ok(scenarios)
        }
    }
}
