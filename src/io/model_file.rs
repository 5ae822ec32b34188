//! Model file operations.
//!
//! A booster is written as one self-describing JSON document: a small
//! envelope carrying the file format version and the crate version that
//! wrote it, wrapping the serialized booster.

use crate::boosting::Booster;
use crate::core::constants::{BOOST_ENSEMBLE_VERSION, MODEL_FILE_EXTENSION, MODEL_FORMAT_VERSION};
use crate::core::error::{BoostError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk representation of one booster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEnvelope {
    /// File format version
    pub format_version: u32,
    /// Version of the crate that wrote the file
    pub crate_version: String,
    /// The booster itself
    pub booster: Booster,
}

impl ModelEnvelope {
    /// Wrap a booster in an envelope stamped with the current versions.
    pub fn new(booster: Booster) -> Self {
        ModelEnvelope {
            format_version: MODEL_FORMAT_VERSION,
            crate_version: BOOST_ENSEMBLE_VERSION.to_string(),
            booster,
        }
    }
}

/// Path of the model file for ensemble slot `index` inside `dir`.
pub fn model_file_path<P: AsRef<Path>>(dir: P, index: usize) -> PathBuf {
    dir.as_ref()
        .join(format!("{}.{}", index, MODEL_FILE_EXTENSION))
}

/// Indices of model files in `dir` numbered above `gap`, ascending.
///
/// An unreadable directory yields no indices.
pub fn model_files_beyond<P: AsRef<Path>>(dir: P, gap: usize) -> Vec<usize> {
    let entries = match std::fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut indices: Vec<usize> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(MODEL_FILE_EXTENSION) {
                return None;
            }
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<usize>().ok())
        })
        .filter(|&index| index > gap)
        .collect();
    indices.sort_unstable();
    indices
}

/// Write `booster` to `path`.
///
/// The parent directory must already exist.
pub fn save_booster<P: AsRef<Path>>(booster: &Booster, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &ModelEnvelope::new(booster.clone()))?;
    writer.flush()?;
    log::debug!("Saved booster with {} trees to {}", booster.num_trees(), path.display());
    Ok(())
}

/// Read a booster from `path`, checking the format version.
pub fn load_booster<P: AsRef<Path>>(path: P) -> Result<Booster> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let envelope: ModelEnvelope = serde_json::from_reader(reader)?;

    if envelope.format_version != MODEL_FORMAT_VERSION {
        return Err(BoostError::serialization(format!(
            "{} has format version {} (written by {}), expected {}",
            path.display(),
            envelope.format_version,
            envelope.crate_version,
            MODEL_FORMAT_VERSION
        )));
    }

    envelope.booster.validate()?;
    log::debug!(
        "Loaded booster with {} trees from {}",
        envelope.booster.num_trees(),
        path.display()
    );
    Ok(envelope.booster)
}
