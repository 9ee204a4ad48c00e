//! JSON snapshot format: `{"nodes": [...], "relationships": [...]}`

use super::{ensure_parent_dir, GraphSnapshot};
use crate::storage::StorageResult;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn write_json(snapshot: &GraphSnapshot, path: &Path) -> StorageResult<()> {
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_json(path: &Path) -> StorageResult<GraphSnapshot> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
