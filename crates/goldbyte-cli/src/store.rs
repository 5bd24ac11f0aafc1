//! Ledger state file
//!
//! The CLI keeps the whole ledger as one pretty-printed JSON snapshot. Every
//! load re-validates the ledger invariants; every save writes a temporary
//! file next to the state and renames it over the old one. Writers hold an
//! exclusive lock on `<state>.lock` from load to save, so concurrent
//! commands apply one after the other.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context};
use fd_lock::RwLock;
use goldbyte_ledger::{GoldByteLedger, LedgerConfig, LedgerState, SystemClock};
use tracing::debug;

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a fresh ledger file, refusing to overwrite one unless `force`
    pub fn create(&self, config: &LedgerConfig, force: bool) -> anyhow::Result<GoldByteLedger> {
        let mut lock = self.lock_file()?;
        let _guard = lock
            .write()
            .with_context(|| format!("Failed to lock {}", self.path.display()))?;

        if self.path.exists() && !force {
            bail!(
                "{} already exists (use --force to start a new ledger)",
                self.path.display()
            );
        }
        let ledger = GoldByteLedger::new(config);
        self.save(&ledger)?;
        Ok(ledger)
    }

    /// Read-only load. Saves replace the file atomically, so no lock is needed.
    pub fn load(&self) -> anyhow::Result<GoldByteLedger> {
        let raw = fs::read_to_string(&self.path).with_context(|| {
            format!(
                "Failed to read ledger state {} (run `goldbyte init` first)",
                self.path.display()
            )
        })?;
        let state: LedgerState = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse ledger state {}", self.path.display()))?;
        let ledger = GoldByteLedger::from_snapshot(state, Arc::new(SystemClock))
            .with_context(|| format!("Ledger state {} is inconsistent", self.path.display()))?;
        debug!(path = %self.path.display(), "Ledger state loaded");
        Ok(ledger)
    }

    /// Load the ledger, run `change` and save the result, all under the
    /// state file's exclusive lock. Nothing is written when `change` fails or
    /// commits no events.
    pub fn update<T>(
        &self,
        change: impl FnOnce(&GoldByteLedger) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut lock = self.lock_file()?;
        let _guard = lock
            .write()
            .with_context(|| format!("Failed to lock {}", self.path.display()))?;

        let ledger = self.load()?;
        let before = ledger.snapshot().journal().len();
        let value = change(&ledger)?;
        if ledger.snapshot().journal().len() != before {
            self.save(&ledger)?;
        }
        Ok(value)
    }

    fn save(&self, ledger: &GoldByteLedger) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&*ledger.snapshot())?;
        let tmp = self.sibling(&format!("{}.tmp", process::id()));

        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Ledger state saved");
        Ok(())
    }

    fn lock_file(&self) -> anyhow::Result<RwLock<File>> {
        let path = self.sibling("lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;
        Ok(RwLock::new(file))
    }

    /// `<state>.<suffix>` in the state file's directory
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }
}
