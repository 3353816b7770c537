//! Artifact persistence: the compiled output is written verbatim to
//! `<job_id>.js` in the output directory, overwriting any previous run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write the artifact and return the path it landed at.
pub fn write(dir: &Path, job_id: &str, text: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("{job_id}.js"));
    fs::write(&path, text)?;
    Ok(path)
}
