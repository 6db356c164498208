use std::{
    collections::HashMap,
    env, fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

/// Layered configuration: built-in defaults, then `~/.config/wfrun/.wfrunrc`
/// (KEY=VALUE lines), then environment variables taking precedence.
#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().flatten() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Environment overlay takes precedence
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self {
            inner: map,
            config_path,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "ARGO_HOST",
        "ARGO_TOKEN",
        "ARGO_NAMESPACE",
        "REQUEST_TIMEOUT",
        "POLL_INTERVAL",
        "MAX_WAIT",
        "TAIL_LINES",
        "VERIFY_TLS",
    ];

    KEYS.contains(&k) || k.starts_with("WFRUN_") || k.starts_with("ARGO_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("wfrun").join(".wfrunrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("REQUEST_TIMEOUT".into(), "30".into());
    m.insert("POLL_INTERVAL".into(), "10".into());
    m.insert("MAX_WAIT".into(), "3600".into());
    m.insert("TAIL_LINES".into(), "100".into());
    // Internal engines usually sit behind self-signed certs
    m.insert("VERIFY_TLS".into(), "false".into());

    m
}
