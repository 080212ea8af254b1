//! Run settings for the triage pipeline, read from the environment.
//!
//! # Environment variables
//!
//! - `PROGRAM_HANDLE`              = program filter for listing mode
//! - `CUSTOM_FIELD_ID_VALIDITY`    = field id for the validity label
//! - `CUSTOM_FIELD_ID_COMPLEXITY`  = field id for the complexity label
//! - `CUSTOM_FIELD_ID_PRODUCT_AREA`= field id for the product area
//! - `CUSTOM_FIELD_ID_SQUAD_OWNER` = field id for the squad owner
//! - `OWNERSHIP_FILE`              = ownership reference table (default `./config/ownership.csv.sample`)
//! - `CSV_OUTPUT_FILE`             = CSV export (default `./data/hai-on-hackerone-output.csv`)
//! - `WATCH_FILE`                  = report id feed (default `./data/report_ids.txt`)
//!
//! Credentials, API base and polling knobs come from
//! [`ai_completion_service::config::default_config::config_from_env`].

use std::path::PathBuf;

use ai_completion_service::CompletionConfig;
use ai_completion_service::config::default_config::config_from_env;
use ai_completion_service::error_handler::env_or;

use crate::actions::{ActionSet, CustomFieldIds};
use crate::errors::ConfigError;
use crate::platform::PlatformConfig;

pub const DEFAULT_OWNERSHIP_FILE: &str = "./config/ownership.csv.sample";
pub const DEFAULT_CSV_OUTPUT_FILE: &str = "./data/hai-on-hackerone-output.csv";
pub const DEFAULT_WATCH_FILE: &str = "./data/report_ids.txt";

#[derive(Debug, Clone)]
pub struct TriageSettings {
    pub completion: CompletionConfig,
    pub program: Option<String>,
    pub fields: Option<CustomFieldIds>,
    pub ownership_file: PathBuf,
    pub csv_output_file: PathBuf,
    pub watch_file: PathBuf,
}

impl TriageSettings {
    /// Reads settings; custom field ids are required only when `actions`
    /// enables field updates.
    ///
    /// # Errors
    /// [`ConfigError`] naming the first missing or invalid variable.
    pub fn from_env(actions: ActionSet) -> Result<Self, ConfigError> {
        let completion = config_from_env()?;

        let fields = if actions.custom_fields {
            Some(CustomFieldIds {
                validity: required("CUSTOM_FIELD_ID_VALIDITY")?,
                complexity: required("CUSTOM_FIELD_ID_COMPLEXITY")?,
                product_area: required("CUSTOM_FIELD_ID_PRODUCT_AREA")?,
                squad_owner: required("CUSTOM_FIELD_ID_SQUAD_OWNER")?,
            })
        } else {
            None
        };

        Ok(Self {
            completion,
            program: optional("PROGRAM_HANDLE"),
            fields,
            ownership_file: env_or("OWNERSHIP_FILE", DEFAULT_OWNERSHIP_FILE).into(),
            csv_output_file: env_or("CSV_OUTPUT_FILE", DEFAULT_CSV_OUTPUT_FILE).into(),
            watch_file: env_or("WATCH_FILE", DEFAULT_WATCH_FILE).into(),
        })
    }

    /// Program handle, required by listing mode only.
    pub fn require_program(&self) -> Result<&str, ConfigError> {
        self.program
            .as_deref()
            .ok_or(ConfigError::MissingVar("PROGRAM_HANDLE"))
    }

    /// Platform client settings share the completion credentials and base.
    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig {
            base_api: self.completion.base_api.clone(),
            api_name: self.completion.api_name.clone(),
            api_key: self.completion.api_key.clone(),
            timeout_secs: self.completion.timeout_secs,
        }
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}
