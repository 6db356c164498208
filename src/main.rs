use std::env;
use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use wfrun::cli::{self, Cli};
use wfrun::config::Config;
use wfrun::engine::EngineClient;
use wfrun::error::Error;
use wfrun::observe::RetryPolicy;
use wfrun::run::{self, viewing_url, RunConfig, RunResult};
use wfrun::Phase;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wfrun=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // CLI overrides land in the environment before config load, so the usual
    // precedence (env over rc file) covers them too.
    if let Some(host) = &args.host {
        env::set_var("ARGO_HOST", host);
    }
    if let Some(namespace) = &args.namespace {
        env::set_var("ARGO_NAMESPACE", namespace);
    }
    if args.verify_tls {
        env::set_var("VERIFY_TLS", "true");
    }
    if args.insecure_skip_verify {
        env::set_var("VERIFY_TLS", "false");
    }

    let cfg = Config::load();
    let host = cfg
        .get("ARGO_HOST")
        .filter(|s| !s.trim().is_empty())
        .context("no engine host; pass --host or set ARGO_HOST")?;
    let namespace = cfg
        .get("ARGO_NAMESPACE")
        .filter(|s| !s.trim().is_empty())
        .context("no namespace; pass --namespace or set ARGO_NAMESPACE")?;

    let client = EngineClient::from_config(&cfg)?;
    let run_cfg = RunConfig {
        host: host.clone(),
        namespace,
        template: args.template.clone(),
        kind: args.kind.clone(),
        parameters: cli::parse_assignments(&args.param, "param")?,
        labels: cli::parse_assignments(&args.label, "label")?,
        names_of_interest: args.output.clone(),
        poll_interval: Duration::from_secs(
            args.poll_interval
                .or_else(|| cfg.get_u64("POLL_INTERVAL"))
                .unwrap_or(10),
        ),
        max_wait: Duration::from_secs(
            args.max_wait.or_else(|| cfg.get_u64("MAX_WAIT")).unwrap_or(3600),
        ),
        tail_lines: args
            .tail_lines
            .or_else(|| cfg.get_u64("TAIL_LINES").map(|v| v as u32))
            .unwrap_or(100),
        retry: RetryPolicy::default(),
    };

    match run::run(&client, &run_cfg, |line| println!("{line}")).await {
        Ok(result) => {
            report(&result)?;
            if result.phase != Phase::Succeeded && !args.no_fail_on_phase {
                bail!("workflow {} finished {}", result.handle, result.phase);
            }
            Ok(())
        }
        Err(Error::Timeout { waited, last }) => {
            // Surface partial progress before failing: the execution may
            // still be running on the engine.
            let partial = RunResult {
                url: viewing_url(&host, &last.handle),
                handle: last.handle.clone(),
                phase: last.phase,
                parameters: Default::default(),
            };
            report(&partial)?;
            bail!(
                "no terminal phase after {:?}; last observed {} — still visible at {}",
                waited,
                last.phase,
                partial.url
            )
        }
        Err(err) => Err(err.into()),
    }
}

fn report(result: &RunResult) -> Result<()> {
    let phase = match result.phase {
        Phase::Succeeded => result.phase.green().to_string(),
        Phase::Failed | Phase::Error => result.phase.red().to_string(),
        _ => result.phase.yellow().to_string(),
    };
    eprintln!("{} finished {} ({})", result.handle, phase, result.url);

    if let Ok(path) = env::var("GITHUB_OUTPUT") {
        write_github_outputs(&path, result)?;
    } else {
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    Ok(())
}

/// Append `name=value` output lines for the calling CI step.
fn write_github_outputs(path: &str, result: &RunResult) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open GITHUB_OUTPUT file {}", path))?;
    writeln!(file, "workflow-name={}", result.handle.name)?;
    writeln!(file, "workflow-url={}", result.url)?;
    writeln!(file, "phase={}", result.phase)?;
    for (name, value) in &result.parameters {
        writeln!(file, "{}={}", name, value)?;
    }
    Ok(())
}
