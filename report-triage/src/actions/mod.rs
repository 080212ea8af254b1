//! Side effects applied to a finished [`TriageResult`].
//!
//! Each action is opt-in. Enabled actions run in a fixed order: internal
//! comment, custom-field updates, CSV row. The first failing action stops the
//! remaining ones for that report.

pub mod comment;
pub mod csv_export;

use std::future::Future;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::console;
use crate::errors::{ActionError, ConfigError};
use crate::platform::PlatformClient;
use crate::triage::TriageResult;

pub use comment::render_comment;
pub use csv_export::CsvExporter;

/// Which actions run for each result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    pub comment: bool,
    pub custom_fields: bool,
    pub csv: bool,
}

impl ActionSet {
    /// Field updates only; what the webhook/watcher pipeline applies.
    pub const FIELDS_ONLY: ActionSet = ActionSet {
        comment: false,
        custom_fields: true,
        csv: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.comment || self.custom_fields || self.csv)
    }
}

/// Custom field attribute ids on the report platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldIds {
    pub validity: String,
    pub complexity: String,
    pub product_area: String,
    pub squad_owner: String,
}

/// Consumer of finished triage results.
///
/// Implemented by [`ActionDispatcher`]; tests plug in recording sinks.
pub trait TriageSink: Send + Sync {
    fn dispatch(&self, result: &TriageResult) -> impl Future<Output = Result<(), ActionError>> + Send;
}

/// Applies the configured [`ActionSet`] against the report platform and the
/// local CSV file.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    platform: PlatformClient,
    actions: ActionSet,
    fields: Option<CustomFieldIds>,
    csv: CsvExporter,
}

impl ActionDispatcher {
    /// # Errors
    /// [`ConfigError::MissingVar`] when field updates are enabled without
    /// field ids.
    pub fn new(
        platform: PlatformClient,
        actions: ActionSet,
        fields: Option<CustomFieldIds>,
        csv_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if actions.custom_fields && fields.is_none() {
            return Err(ConfigError::MissingVar("CUSTOM_FIELD_ID_VALIDITY"));
        }
        Ok(Self {
            platform,
            actions,
            fields,
            csv: CsvExporter::new(csv_path),
        })
    }

    async fn update_fields(&self, result: &TriageResult) -> Result<(), ActionError> {
        let Some(ids) = &self.fields else {
            return Ok(());
        };
        let updates = [
            (&ids.validity, &result.validity.predicted_value),
            (&ids.complexity, &result.complexity.predicted_value),
            (&ids.product_area, &result.ownership.product_area),
            (&ids.squad_owner, &result.ownership.squad_owner),
        ];
        for (field_id, value) in updates {
            debug!(report_id = %result.report_id, field_id = %field_id, value = %value, "updating custom field");
            self.platform
                .update_custom_field(&result.report_id, field_id, value)
                .await?;
        }
        Ok(())
    }
}

impl TriageSink for ActionDispatcher {
    async fn dispatch(&self, result: &TriageResult) -> Result<(), ActionError> {
        let id = result.report_id.as_str();

        if self.actions.comment {
            console::progress("Posting private comment...");
            self.platform
                .post_internal_comment(id, &render_comment(result))
                .await?;
            console::success("Private comment posted");
        }

        if self.actions.custom_fields {
            console::progress("Updating custom fields...");
            self.update_fields(result).await?;
            console::success("Custom fields updated");
        }

        if self.actions.csv {
            console::progress("Writing CSV row...");
            self.csv.append(result)?;
            console::success(&format!("CSV output updated: {}", self.csv.path().display()));
        }

        info!(report_id = id, actions = ?self.actions, "actions dispatched");
        Ok(())
    }
}
