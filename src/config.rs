//! Runtime configuration for the expression engine, loaded from TOML.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::number::DEFAULT_PRECISION;
use crate::parser::MAX_EXPRESSION_DEPTH;
use crate::vm::DEFAULT_STACK_CAPACITY;

/// Directory under the user's config directory.
const CONFIG_DIR: &str = "solvra_expr";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Value-stack bound of the virtual machine.
    pub stack_capacity: usize,
    /// Parser nesting limit.
    pub max_depth: usize,
    /// Log each executed instruction.
    pub trace: bool,
    /// Emit every statement's tree before executing it.
    pub print_ast: bool,
    /// Emit every statement's bytecode listing before executing it.
    pub emit_bytecode: bool,
    /// Decimal digits when rendering results.
    pub precision: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            max_depth: MAX_EXPRESSION_DEPTH,
            trace: false,
            print_ast: false,
            emit_bytecode: false,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl RuntimeConfig {
    /// `<config dir>/solvra_expr/config.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load an explicit file, or the default file when it exists, or defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        let cfg: Self = toml::from_str(&data)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        Ok(cfg)
    }

    /// Persist the configuration, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let serialized = toml::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("writing configuration to {}", path.display()))?;
        Ok(())
    }
}
