use crate::error::{Result, TriageError};
use crate::paths;
use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Identity boundary: the current actor as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// PromotionMode
// ---------------------------------------------------------------------------

/// How task promotion handles a `sprint_cycle` that resolves to no sprint.
///
/// The reference behavior is a silent skip; `Strict` surfaces the dangling
/// reference as an error instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionMode {
    #[default]
    Lenient,
    Strict,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: String,
    #[serde(default)]
    pub promotion: PromotionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Config {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            promotion: PromotionMode::default(),
            user: None,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TriageError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// The configured actor, or `NoUser` if none has been set.
    pub fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(TriageError::NoUser)
    }

    pub fn set_user(&mut self, name: impl Into<String>, role: Role) {
        self.user = Some(User {
            name: name.into(),
            role,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
