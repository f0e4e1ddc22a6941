//! In-memory translation edits for one branch, and saving them back.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::activity::Indicator;
use crate::api::{Backend, TranslationFile, TranslationMap};
use crate::auth::AccessToken;
use crate::error::DraftError;

/// filename -> (key -> current value). Seeded from the loaded files.
///
/// Ordered by filename, which is also the order files are saved in.
pub type DraftState = BTreeMap<String, TranslationMap>;

pub struct DraftManager {
    backend: Arc<dyn Backend>,
    branch: Option<String>,
    files: Vec<TranslationFile>,
    drafts: DraftState,
    loading: Indicator,
    saving: Indicator,
}

impl DraftManager {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            branch: None,
            files: Vec::new(),
            drafts: DraftState::new(),
            loading: Indicator::default(),
            saving: Indicator::default(),
        }
    }

    /// Branch the current files were loaded from.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn files(&self) -> &[TranslationFile] {
        &self.files
    }

    pub fn drafts(&self) -> &DraftState {
        &self.drafts
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_active()
    }

    /// Handle that reads true while a load is in flight.
    pub fn loading_indicator(&self) -> Indicator {
        self.loading.clone()
    }

    /// Handle that reads true while a save is in flight. A renderer disables
    /// its save trigger while this is set.
    pub fn saving_indicator(&self) -> Indicator {
        self.saving.clone()
    }

    /// Fetch the translatable files of `branch` and reseed the drafts from them.
    ///
    /// On failure the previous files and drafts are kept; calling again retries.
    pub async fn load_for_branch(
        &mut self,
        token: &AccessToken,
        branch: &str,
    ) -> Result<&[TranslationFile], DraftError> {
        info!("Loading translations for branch {}", branch);
        let result = {
            let _busy = self.loading.hold();
            self.backend.branch_diff(token, branch).await
        };

        let diff = result.map_err(|source| {
            warn!("Failed to load translations for {}: {}", branch, source);
            DraftError::Load {
                branch: branch.to_string(),
                source,
            }
        })?;

        self.drafts = diff
            .files
            .iter()
            .filter_map(|file| {
                file.translations
                    .as_ref()
                    .map(|t| (file.filename.clone(), t.clone()))
            })
            .collect();
        self.files = diff.files;
        self.branch = Some(branch.to_string());

        info!(
            "Loaded {} files ({} translatable) for branch {}",
            self.files.len(),
            self.drafts.len(),
            branch
        );
        Ok(&self.files)
    }

    /// Set the draft value of `key` in `filename`. Unknown files and keys are created.
    pub fn edit_entry(&mut self, filename: &str, key: &str, value: impl Into<String>) {
        self.drafts
            .entry(filename.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Value to show for an entry: the draft, else what was loaded.
    ///
    /// A cleared (empty) draft shows the loaded value again; the empty string
    /// is still what gets saved.
    pub fn display_value(&self, filename: &str, key: &str) -> Option<&str> {
        self.drafts
            .get(filename)
            .and_then(|entries| entries.get(key))
            .filter(|value| !value.is_empty())
            .or_else(|| {
                self.files
                    .iter()
                    .find(|f| f.filename == filename)
                    .and_then(|f| f.translations.as_ref())
                    .and_then(|t| t.get(key))
            })
            .map(String::as_str)
    }

    /// Send every file in the draft state to `branch`, one request per file.
    ///
    /// Requests go out sequentially in filename order and stop at the first
    /// failure. Files sent before the failure stay committed on the backend and
    /// the caller only sees `PartialSaveFailure`. Returns the number of files saved.
    ///
    /// A call made while another save is running fails with `SaveInProgress`
    /// and sends nothing.
    pub async fn save_all(&self, token: &AccessToken, branch: &str) -> Result<usize, DraftError> {
        let Some(_busy) = self.saving.try_hold() else {
            warn!("Save requested for {} while another save is running", branch);
            return Err(DraftError::SaveInProgress);
        };
        save_sequentially(&*self.backend, &self.drafts, token, branch).await
    }

    /// Drop everything loaded; used when the branch context goes away.
    pub fn clear(&mut self) {
        self.branch = None;
        self.files.clear();
        self.drafts.clear();
    }
}

async fn save_sequentially(
    backend: &dyn Backend,
    drafts: &DraftState,
    token: &AccessToken,
    branch: &str,
) -> Result<usize, DraftError> {
    let mut saved = 0;
    for (filename, translations) in drafts {
        info!(
            "Saving {} ({} entries) to branch {}",
            filename,
            translations.len(),
            branch
        );
        if let Err(e) = backend.update_file(token, branch, filename, translations).await {
            warn!(
                "Save aborted at {} after {} file(s) were committed: {}",
                filename, saved, e
            );
            return Err(DraftError::PartialSaveFailure(e));
        }
        saved += 1;
    }

    info!("Saved {} file(s) to branch {}", saved, branch);
    Ok(saved)
}
