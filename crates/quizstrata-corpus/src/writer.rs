//! JSON-lines output for stratum samples

use quizstrata_core::{Record, Result, Stratum};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes one `<stratum>.jsonl` file per stratum into an output directory
#[derive(Debug, Clone)]
pub struct SampleWriter {
    output_dir: PathBuf,
}

impl SampleWriter {
    /// Create the output directory if needed
    pub fn create(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the file holding a stratum's sample
    pub fn stratum_path(&self, stratum: Stratum) -> PathBuf {
        self.output_dir.join(format!("{}.jsonl", stratum.file_stem()))
    }

    /// Replace the stratum's file with `records`, one JSON object per line
    pub fn write_stratum<'r, I>(&self, stratum: Stratum, records: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let path = self.stratum_path(stratum);
        let written = write_jsonl(&path, records)?;
        debug!(stratum = %stratum, path = %path.display(), written, "Wrote stratum sample");
        Ok(path)
    }

    /// Write any serializable value as pretty JSON under `file_name`
    pub fn write_json<T: serde::Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(path)
    }
}

/// Write records as JSON lines, returning how many were written
pub fn write_jsonl<'r, I>(path: &Path, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'r Record>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    let mut written = 0;
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
