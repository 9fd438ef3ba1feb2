//! Streaming load and atomic save of document files.

use super::{StoreError, StoreResult};
use crate::codec::{decode_reader, write_to, CodecError};
use crate::tree::BulletTree;
use log::{error, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;

/// File extension offered by save dialogs for outline documents.
pub const SILVER_FILE_EXTENSION: &str = "silver";

/// Loads a document file.
///
/// An empty file yields a tree holding the seed bullet.
///
/// # Side effects
/// - Emits `doc_load` logging events with duration and status.
///
/// # Errors
/// - `Io` when the file cannot be opened or read.
/// - `Codec` when any line is invalid; no partial tree is returned.
pub fn read_tree(path: impl AsRef<Path>) -> StoreResult<BulletTree> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=doc_load module=store status=start");

    let file = File::open(path).map_err(|source| {
        error!(
            "event=doc_load module=store status=error duration_ms={} error_code=file_open_failed error={}",
            started_at.elapsed().as_millis(),
            source
        );
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    match decode_reader(BufReader::new(file)) {
        Ok(tree) => {
            info!(
                "event=doc_load module=store status=ok duration_ms={} bullets={}",
                started_at.elapsed().as_millis(),
                tree.len()
            );
            Ok(tree)
        }
        Err(CodecError::Io(source)) => {
            error!(
                "event=doc_load module=store status=error duration_ms={} error_code=file_read_failed error={}",
                started_at.elapsed().as_millis(),
                source
            );
            Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(source) => {
            // Line content is user text; log the position only.
            error!(
                "event=doc_load module=store status=error duration_ms={} error_code=decode_failed line={}",
                started_at.elapsed().as_millis(),
                source.line_number().unwrap_or_default()
            );
            Err(StoreError::Codec {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Saves a document file atomically.
///
/// The encoded document is written to a temporary file next to `path` and
/// renamed over it once fully flushed.
///
/// # Side effects
/// - Emits `doc_save` logging events with duration and status.
///
/// # Errors
/// - `Io` when the temporary file cannot be written or renamed.
pub fn write_tree(path: impl AsRef<Path>, tree: &BulletTree) -> StoreResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=doc_save module=store status=start");

    match write_atomically(path, tree) {
        Ok(()) => {
            info!(
                "event=doc_save module=store status=ok duration_ms={} bullets={}",
                started_at.elapsed().as_millis(),
                tree.len()
            );
            Ok(())
        }
        Err(source) => {
            error!(
                "event=doc_save module=store status=error duration_ms={} error_code=file_write_failed error={}",
                started_at.elapsed().as_millis(),
                source
            );
            Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn write_atomically(path: &Path, tree: &BulletTree) -> std::io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(directory)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_to(tree, &mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
