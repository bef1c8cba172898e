//! Dataset persistence.
//!
//! A pass writes to `<output>/<release>/<language>/`. The four collection files
//! are written into a staging directory next to the target and renamed into
//! place once all of them succeeded, so readers never observe a partial pass.
//! A previous dataset is moved aside first and restored if the final rename
//! fails.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use ltk_tft_data::FusedDataset;
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Directory a dataset is written to.
pub fn dataset_dir(output_dir: &Utf8Path, release: &str, language: &str) -> Utf8PathBuf {
    output_dir.join(release).join(language)
}

/// Write the four collections of `dataset`, replacing any previous output.
pub fn write_dataset(
    output_dir: &Utf8Path,
    dataset: &FusedDataset,
) -> Result<Utf8PathBuf, CliError> {
    let target = dataset_dir(output_dir, &dataset.release, &dataset.language);
    write_staged(&target, dataset).map_err(|e| CliError::write_failed(target.clone(), e))?;

    tracing::info!("Wrote {} dataset to {}", dataset.language, target);
    Ok(target)
}

fn write_staged(target: &Utf8Path, dataset: &FusedDataset) -> io::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "target has no parent"))?;
    fs::create_dir_all(parent)?;

    // Removed on drop unless the rename below moved it away.
    let staging = tempfile::Builder::new()
        .prefix(&format!(".{}-", dataset.language))
        .tempdir_in(parent)?;

    write_json_pretty(&staging.path().join("augments.json"), &dataset.augments)?;
    write_json_pretty(&staging.path().join("champions.json"), &dataset.champions)?;
    write_json_pretty(&staging.path().join("items.json"), &dataset.items)?;
    write_json_pretty(&staging.path().join("traits.json"), &dataset.traits)?;

    let previous = tempfile::Builder::new()
        .prefix(&format!(".{}-previous-", dataset.language))
        .tempdir_in(parent)?;
    swap_into_place(staging.path(), target.as_std_path(), &previous.path().join("dataset"))
}

/// Rename `staged` to `target`, parking an existing `target` at `aside`.
///
/// The caller owns `aside` and deletes it once the swap is done.
fn swap_into_place(staged: &Path, target: &Path, aside: &Path) -> io::Result<()> {
    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, aside)?;
    }

    if let Err(err) = fs::rename(staged, target) {
        if had_previous {
            if let Err(restore) = fs::rename(aside, target) {
                tracing::error!(
                    "Failed to restore previous dataset {}: {}",
                    target.display(),
                    restore
                );
            }
        }
        return Err(err);
    }

    Ok(())
}

/// Writes pretty-formatted JSON to the given path.
fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()
}
