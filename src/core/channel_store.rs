//! Persisted list of tracked channels
//!
//! The store keeps the configuration that was loaded at start-up as an immutable
//! snapshot and records additions as pending changes. Nothing touches the file
//! until [`ChannelStore::commit`], which writes the merged result atomically.

use crate::core::config::{Channel, Config};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// A change waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChange {
    AddChannel(Channel),
}

/// Result of [`ChannelStore::add_channel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// A channel with the same id is already tracked (or already pending)
    Duplicate(Channel),
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

#[derive(Debug)]
pub struct ChannelStore {
    path: PathBuf,
    snapshot: Config,
    pending: Vec<ConfigChange>,
}

impl ChannelStore {
    /// Load the store from a config file
    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = Config::load(path)?;
        Ok(Self::with_config(path, snapshot))
    }

    /// Wrap an already-loaded config (useful for testing)
    pub fn with_config(path: &Path, snapshot: Config) -> Self {
        Self {
            path: path.to_path_buf(),
            snapshot,
            pending: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configuration as loaded, without pending changes
    pub fn snapshot(&self) -> &Config {
        &self.snapshot
    }

    pub fn pending(&self) -> &[ConfigChange] {
        &self.pending
    }

    /// Tracked channels including pending additions, in insertion order
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = self.snapshot.channels.clone();
        for change in &self.pending {
            match change {
                ConfigChange::AddChannel(channel) => channels.push(channel.clone()),
            }
        }
        channels
    }

    fn find(&self, id: &str) -> Option<Channel> {
        self.channels().into_iter().find(|c| c.id == id)
    }

    /// Tracked channels (including pending ones) whose directory is `name`
    pub fn channels_named(&self, name: &str) -> Vec<Channel> {
        self.channels()
            .into_iter()
            .filter(|c| c.name == name)
            .collect()
    }

    /// Queue a channel for addition unless its id is already tracked
    ///
    /// Invalid names or ids are rejected with an error; a duplicate id is not an
    /// error and leaves the store untouched.
    pub fn add_channel(&mut self, channel: Channel) -> Result<AddOutcome> {
        channel.validate()?;

        if let Some(existing) = self.find(&channel.id) {
            log::info!("Channel ID '{}' already in archive", channel.id);
            return Ok(AddOutcome::Duplicate(existing));
        }

        for other in self.channels_named(&channel.name) {
            log::warn!(
                "Channel '{}' shares its directory with {}; their syncs will purge each other's videos",
                channel.name,
                other.id
            );
        }

        log::debug!("Queued channel '{}' ({})", channel.name, channel.id);
        self.pending.push(ConfigChange::AddChannel(channel));
        Ok(AddOutcome::Added)
    }

    /// Apply pending changes and write the file; a no-op when nothing is pending
    pub fn commit(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut next = self.snapshot.clone();
        for change in &self.pending {
            match change {
                ConfigChange::AddChannel(channel) => next.channels.push(channel.clone()),
            }
        }

        next.save(&self.path)?;
        log::info!(
            "Wrote {} change(s) to {:?}",
            self.pending.len(),
            self.path
        );

        self.snapshot = next;
        self.pending.clear();
        Ok(())
    }
}
