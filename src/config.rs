//! Formatter run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matcher::compile_glob;

/// Glob used when no `glob` parameter is supplied.
pub const DEFAULT_GLOB: &str = "**/*";

/// Files handed to one formatter invocation when no slice size is supplied.
pub const DEFAULT_FILES_PER_SLICE: usize = 100;

/// Options recognized for a formatting run.
///
/// Field names follow the skill parameter names (`onlyFormatChangedFiles`,
/// `filesToFormatPerSlice`, ...). Parameters that belong to the surrounding
/// event handler, such as the push strategy or PR labels, are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatterConfiguration {
    #[serde(default = "default_glob")]
    pub glob: String,

    #[serde(default)]
    pub ignores: Vec<String>,

    #[serde(default)]
    pub only_format_changed_files: bool,

    #[serde(default = "default_files_per_slice")]
    pub files_to_format_per_slice: usize,

    /// Opaque style definition written verbatim before formatting.
    #[serde(default, alias = "config")]
    pub codestyle: Option<String>,
}

fn default_glob() -> String {
    DEFAULT_GLOB.to_string()
}

fn default_files_per_slice() -> usize {
    DEFAULT_FILES_PER_SLICE
}

impl Default for FormatterConfiguration {
    fn default() -> Self {
        Self {
            glob: default_glob(),
            ignores: Vec::new(),
            only_format_changed_files: false,
            files_to_format_per_slice: DEFAULT_FILES_PER_SLICE,
            codestyle: None,
        }
    }
}

impl FormatterConfiguration {
    /// Load parameters from a JSON file and validate them.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files_to_format_per_slice == 0 {
            return Err(ConfigError::ZeroSliceSize);
        }

        compile_glob(&self.glob).map_err(|source| ConfigError::InvalidGlob {
            pattern: self.glob.clone(),
            source,
        })?;

        Ok(())
    }

    /// Style definition, treating an empty string as absent.
    ///
    /// Whitespace-only text is still passed through to the formatter.
    pub fn style_definition(&self) -> Option<&str> {
        self.codestyle.as_deref().filter(|s| !s.is_empty())
    }
}
