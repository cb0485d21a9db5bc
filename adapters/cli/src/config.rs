//! Table configuration read from `ledger.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use monopoly_ledger_core::{Money, PlayerName, Roster};
use monopoly_ledger_history::{TableSetup, BANK_RESERVE, STARTING_MONEY};
use monopoly_ledger_system_catalog::PropertyCatalog;
use serde::Deserialize;

/// Configuration file consulted when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "ledger.toml";

/// Players, money and catalog used when opening a game.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LedgerConfig {
    pub(crate) players: Vec<String>,
    pub(crate) bank: String,
    pub(crate) starting_money: Money,
    pub(crate) bank_reserve: Money,
    pub(crate) catalog: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            players: ["Amelie", "Sofia", "Jackie", "Andrea"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            bank: "Bank".to_owned(),
            starting_money: STARTING_MONEY,
            bank_reserve: BANK_RESERVE,
            catalog: None,
        }
    }
}

impl LedgerConfig {
    /// Loads the configuration. An explicit path must exist; the default
    /// path falls back to built-in defaults when absent.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .with_context(|| format!("invalid configuration at {}", path.display()))?;
        if let (Some(catalog), Some(base)) = (config.catalog.as_mut(), path.parent()) {
            if catalog.is_relative() {
                *catalog = base.join(&*catalog);
            }
        }
        Ok(config)
    }

    /// Parses configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse ledger configuration toml contents")
    }

    /// Builds the roster of the configured participants.
    pub(crate) fn roster(&self) -> Result<Roster> {
        let humans = self.players.iter().map(PlayerName::new).collect();
        Roster::new(humans, PlayerName::new(&self.bank)).context("invalid player roster")
    }

    /// Money distribution for a new game.
    pub(crate) fn setup(&self) -> TableSetup {
        TableSetup {
            starting_money: self.starting_money,
            bank_reserve: self.bank_reserve,
        }
    }

    /// Loads the configured catalog, or the standard board.
    pub(crate) fn catalog(&self) -> Result<PropertyCatalog> {
        let Some(path) = &self.catalog else {
            return Ok(PropertyCatalog::standard());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read property catalog at {}", path.display()))?;
        PropertyCatalog::from_toml_str(&contents)
            .with_context(|| format!("invalid property catalog at {}", path.display()))
    }
}
