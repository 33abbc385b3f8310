//! Hands the materialized output root to the external deploy CLI.

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub trait Deployer {
    fn deploy(&self, out_dir: &Path, alias: &str) -> Result<()>;
}

pub struct CliDeployer {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl CliDeployer {
    pub fn new(cfg: &Config) -> Result<Self> {
        let program = cfg.deploy.program.trim();
        if program.is_empty() {
            return Err(anyhow!("deploy.program is empty"));
        }
        Ok(Self {
            program: program.to_string(),
            args: cfg.deploy.args.clone(),
            env: cfg
                .deploy
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timeout: (cfg.deploy.timeout_seconds > 0)
                .then(|| Duration::from_secs(cfg.deploy.timeout_seconds)),
        })
    }

    /// Arguments with `{alias}` and `{out_dir}` filled in.
    pub fn render_args(&self, out_dir: &Path, alias: &str) -> Vec<String> {
        let out = out_dir.display().to_string();
        self.args
            .iter()
            .map(|a| a.replace("{alias}", alias).replace("{out_dir}", &out))
            .collect()
    }
}

impl Deployer for CliDeployer {
    fn deploy(&self, out_dir: &Path, alias: &str) -> Result<()> {
        let args = self.render_args(out_dir, alias);
        info!("deploy: {} {}", self.program, args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning deploy command: {}", self.program))?;

        let status = match self.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout)?,
            None => child
                .wait()
                .with_context(|| format!("waiting for {}", self.program))?,
        };
        debug!("deploy exited: {status}");

        if !status.success() {
            return Err(match status.code() {
                Some(code) => anyhow!("deploy command {} failed with exit code {code}", self.program),
                None => anyhow!("deploy command {} terminated by signal", self.program),
            });
        }
        Ok(())
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            return Ok(status);
        }

        if start.elapsed() > timeout {
            warn!("deploy command timed out after {:?}", timeout);
            let _ = child.kill();
            child.wait().with_context(|| "wait after kill")?;
            return Err(anyhow!("deploy command exceeded timeout ({:?})", timeout));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
