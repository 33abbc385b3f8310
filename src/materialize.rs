//! Writes an [`ArtifactMap`] to disk under a freshly emptied output root.

use crate::{
    report::{kind, ArtifactMap},
    util::{ensure_dir, recreate_dir, sha256_hex},
};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub rel_path: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

pub fn materialize(artifacts: &ArtifactMap, out_dir: &Path) -> Result<Vec<WrittenFile>> {
    recreate_dir(out_dir)?;

    let mut written = Vec::with_capacity(artifacts.len());
    for (rel, value) in artifacts.iter() {
        let target = resolve_under(out_dir, rel)?;
        let content = match value {
            Value::String(s) => s,
            other => bail!(
                "artifact content for {rel} is not a string (got {})",
                kind(other)
            ),
        };

        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(&target, content)
            .with_context(|| format!("writing artifact: {}", target.display()))?;

        let file = WrittenFile {
            rel_path: rel.to_string(),
            path: target,
            bytes: content.len() as u64,
            sha256: sha256_hex(content.as_bytes()),
        };
        debug!(
            "wrote {} ({} bytes, sha256={})",
            file.path.display(),
            file.bytes,
            file.sha256
        );
        written.push(file);
    }

    Ok(written)
}

/// Joins `rel` onto `root`, refusing anything that would land outside it.
fn resolve_under(root: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    let mut out = root.to_path_buf();
    let mut any = false;
    for comp in rel_path.components() {
        match comp {
            Component::Normal(part) => {
                out.push(part);
                any = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(anyhow!("artifact path escapes output root: {rel:?}"));
            }
        }
    }
    if !any {
        bail!("artifact path is empty: {rel:?}");
    }
    Ok(out)
}
