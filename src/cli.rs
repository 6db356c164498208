use clap::{ArgGroup, Parser};

use crate::error::{Error, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "wfrun", about = "Trigger a templated workflow on a remote engine and watch it to completion", version)]
#[command(group(ArgGroup::new("tls_switch").args(["verify_tls", "insecure_skip_verify"]).multiple(false)))]
pub struct Cli {
    /// Workflow template to submit.
    #[arg(short = 't', long)]
    pub template: String,

    /// Namespace to submit into. Falls back to ARGO_NAMESPACE.
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Engine host, e.g. https://argo.internal:2746. Falls back to ARGO_HOST.
    #[arg(long)]
    pub host: Option<String>,

    /// Template resource kind.
    #[arg(long, default_value = "WorkflowTemplate")]
    pub kind: String,

    /// Workflow parameter as NAME=VALUE. Can be used multiple times.
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", action = clap::ArgAction::Append)]
    pub param: Vec<String>,

    /// Label attached to the submission as NAME=VALUE. Can be used multiple times.
    #[arg(long = "label", value_name = "NAME=VALUE", action = clap::ArgAction::Append)]
    pub label: Vec<String>,

    /// Output parameter to extract after completion. Can be used multiple
    /// times; without it, all output parameters are extracted.
    #[arg(short = 'o', long = "output", value_name = "NAME", action = clap::ArgAction::Append)]
    pub output: Vec<String>,

    /// Seconds between status polls.
    #[arg(long = "poll-interval", value_name = "SECONDS")]
    pub poll_interval: Option<u64>,

    /// Overall wait budget in seconds before giving up on a terminal phase.
    #[arg(long = "max-wait", value_name = "SECONDS")]
    pub max_wait: Option<u64>,

    /// Log tail window requested on each poll.
    #[arg(long = "tail-lines", value_name = "N")]
    pub tail_lines: Option<u32>,

    /// Verify the engine's TLS certificate.
    ///
    /// Off by default: internal engine endpoints commonly use self-signed
    /// certificates.
    #[arg(long = "verify-tls")]
    pub verify_tls: bool,
    /// Accept any TLS certificate (the default).
    #[arg(long = "insecure-skip-verify")]
    pub insecure_skip_verify: bool,

    /// Exit zero even when the workflow finishes Failed or Error.
    #[arg(long = "no-fail-on-phase")]
    pub no_fail_on_phase: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// Split repeated `NAME=VALUE` arguments into pairs. The value may itself
/// contain `=`; only the first one separates.
pub fn parse_assignments(items: &[String], what: &str) -> Result<Vec<(String, String)>> {
    items
        .iter()
        .map(|item| {
            item.split_once('=')
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .ok_or_else(|| {
                    Error::Validation(format!("{} '{}' is not of the form NAME=VALUE", what, item))
                })
        })
        .collect()
}
