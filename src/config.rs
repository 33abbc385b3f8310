use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub deploy: Deploy,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing TOML: {}", path.display()))?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    /// Output root; recreated on every run.
    pub out_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: ".tmp/generated".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deploy {
    pub program: String,
    /// `{alias}` and `{out_dir}` are substituted in each argument.
    pub args: Vec<String>,
    /// 0 disables the timeout.
    pub timeout_seconds: u64,
    pub dry_run: bool,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
impl Default for Deploy {
    fn default() -> Self {
        Self {
            program: "sf".into(),
            args: ["project", "deploy", "start", "-o", "{alias}", "-p", "{out_dir}"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_seconds: 0,
            dry_run: false,
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
