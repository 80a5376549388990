use serde::{Deserialize, Serialize};

use crate::error::RepoResult;

/// Contents of `.ogit/config`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    pub core: CoreConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub repositoryformatversion: u32,
    pub filemode: bool,
    pub bare: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            repositoryformatversion: 0,
            filemode: false,
            bare: false,
        }
    }
}

impl RepoConfig {
    /// Parse TOML configuration text.
    pub fn from_toml(text: &str) -> RepoResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> RepoResult<String> {
        Ok(toml::to_string(self)?)
    }
}
