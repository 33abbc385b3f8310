use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use time::format_description::well_known::Rfc3339;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

/// Removes `p` and everything under it, then creates it empty.
pub fn recreate_dir(p: &Path) -> Result<()> {
    match std::fs::remove_dir_all(p) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("remove_dir_all {}", p.display())),
    }
    ensure_dir(p)
}

/// Resolves `out_dir` against `cwd` and refuses roots whose recreation would
/// destroy something else: empty paths, filesystem roots, the working
/// directory or any of its parents, and anything containing `input`.
pub fn guard_out_dir(out_dir: &Path, cwd: &Path, input: &Path) -> Result<PathBuf> {
    if out_dir.as_os_str().is_empty() {
        bail!("output root is empty");
    }
    let out = normalize(&cwd.join(out_dir));
    if out.parent().is_none() {
        bail!("output root is a filesystem root: {}", out.display());
    }

    let outs = with_canonical(out.clone());
    let cwds = with_canonical(normalize(cwd));
    let inputs = with_canonical(normalize(&cwd.join(input)));
    for o in &outs {
        if cwds.iter().any(|c| c.starts_with(o)) {
            bail!(
                "output root {} is the working directory or one of its parents",
                out.display()
            );
        }
        if inputs.iter().any(|i| i.starts_with(o)) {
            bail!(
                "output root {} contains the input file {}",
                out.display(),
                input.display()
            );
        }
    }
    Ok(out)
}

/// Collapses `.` and `..` without touching the filesystem.
fn normalize(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in p.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(comp);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// `p` plus its symlink-resolved form when it exists.
fn with_canonical(p: PathBuf) -> Vec<PathBuf> {
    match p.canonicalize() {
        Ok(c) if c != p => vec![p, c],
        _ => vec![p],
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    format!("{:x}", h.finalize())
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
