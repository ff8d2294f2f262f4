//! Configuration loading for the tdom toolchain.
//!
//! Settings layer in priority order (highest last):
//! user config dir `tdom-check.toml`, then `[tool.tdom-check]` in
//! `pyproject.toml`, then `.tdom.toml`, then `tdom.toml` at the project
//! root.

mod diagnostics;

pub use diagnostics::DiagnosticSeverity;
pub use diagnostics::DiagnosticsConfig;

use std::fs;
use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read pyproject.toml")]
    PyprojectIo(#[from] std::io::Error),
    #[error("Failed to parse pyproject.toml TOML")]
    PyprojectParse(#[from] toml::de::Error),
    #[error("Failed to serialize extracted pyproject data")]
    PyprojectSerialize(#[from] toml::ser::Error),
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Extra roots (relative to the project root or absolute) searched when
    /// following imports to other modules.
    pub python_roots: Vec<String>,
    pub diagnostics: DiagnosticsConfig,
}

impl Settings {
    /// Load settings for a project root, including the per-user config file
    /// when the platform provides a config directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a config file exists but cannot be read
    /// or deserialized.
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "tdom", "tdom-check")
            .map(|proj_dirs| proj_dirs.config_dir().join("tdom-check.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let pyproject_path = project_root.join("pyproject.toml");
        if pyproject_path.exists() {
            let content = fs::read_to_string(&pyproject_path)?;
            let full_toml_value: toml::Value = toml::from_str(&content)?;

            let table_path = ["tool", "tdom-check"];
            let tool_value_opt: Option<&toml::Value> = table_path
                .iter()
                .try_fold(&full_toml_value, |current_val, &key| current_val.get(key));

            if let Some(tool_table) = tool_value_opt.and_then(|v| v.as_table()) {
                let tool_toml_string = toml::to_string(tool_table)?;
                builder = builder.add_source(File::from_str(&tool_toml_string, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            File::from(project_root.join(".tdom.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("tdom.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }
}
