//! Override rule sources.
//!
//! Some ability descriptions reference variables under names that no fallback
//! can derive. Those are patched by hand-maintained rule files, one per
//! champion and release. The [`OverrideSource`] trait keeps fusion independent
//! of where the rules are stored; [`FsOverrideSource`] reads them from disk.

use crate::error::Result;
use crate::resolve::OverrideRules;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

/// Provides override rules for a champion, if any exist.
///
/// Implementations must be [`Sync`] so that passes for several languages can
/// share one source.
pub trait OverrideSource: Sync {
    /// Load the rules for `champion_id` in `release`.
    ///
    /// Returns `Ok(None)` when no rules exist; that is the common case.
    fn load(&self, release: &str, champion_id: &str) -> Result<Option<OverrideRules>>;
}

/// Reads rule files laid out as:
///
/// ```text
/// root/
///   14.1.1/                  # Release identifier
///     TFT10_Ahri.json        # { "@ModifiedDamage@": "TotalDamage" }
/// ```
pub struct FsOverrideSource {
    root: Utf8PathBuf,
}

impl FsOverrideSource {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn rule_path(&self, release: &str, champion_id: &str) -> Utf8PathBuf {
        self.root.join(release).join(format!("{champion_id}.json"))
    }
}

impl OverrideSource for FsOverrideSource {
    fn load(&self, release: &str, champion_id: &str) -> Result<Option<OverrideRules>> {
        let path = self.rule_path(release, champion_id);
        if !path.as_std_path().exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        let rules: OverrideRules = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded {} override rule(s) from {}", rules.len(), path);
        Ok(Some(rules))
    }
}

/// In-memory rules keyed by champion ID, independent of the release.
impl OverrideSource for HashMap<String, OverrideRules> {
    fn load(&self, _release: &str, champion_id: &str) -> Result<Option<OverrideRules>> {
        Ok(self.get(champion_id).cloned())
    }
}
