use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tcw_jobs::{Endpoints, StatusRules};
use tcw_types::{ProjectMode, PromptKind, SurfaceBindings, VersionKey};

use crate::error::{ValidationError, WorkbenchError, WorkbenchResult};

/// Upper bound on pages per job.
pub const MAX_PAGES: usize = 10;

/// Allowed sampling temperature range, inclusive.
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);

/// Parameters of a recognition job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionOptions {
    pub llm_model: String,
    pub htr_model_id: u64,
    pub temperature: f32,
    pub mode: ProjectMode,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            llm_model: "gemini-2.5-pro".into(),
            htr_model_id: 0,
            temperature: 0.0,
            mode: ProjectMode::Ra,
        }
    }
}

impl RecognitionOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_temperature(self.temperature)?;
        if self.htr_model_id == 0 {
            return Err(ValidationError::MissingHtrModel);
        }
        Ok(())
    }
}

/// Parameters of a final-document job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalDocumentOptions {
    pub llm_model: String,
    pub prompt: PromptKind,
    pub custom_prompt: Option<String>,
    pub temperature: f32,
    pub mode: ProjectMode,
}

impl Default for FinalDocumentOptions {
    fn default() -> Self {
        Self {
            llm_model: "gemini-2.5-pro".into(),
            prompt: PromptKind::Ra,
            custom_prompt: None,
            temperature: 0.0,
            mode: ProjectMode::Ra,
        }
    }
}

impl FinalDocumentOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_temperature(self.temperature)?;
        let custom_blank = self.custom_prompt.as_deref().map_or(true, |p| p.trim().is_empty());
        if self.prompt == PromptKind::Custom && custom_blank {
            return Err(ValidationError::EmptyCustomPrompt);
        }
        Ok(())
    }
}

fn validate_temperature(t: f32) -> Result<(), ValidationError> {
    let (min, max) = TEMPERATURE_RANGE;
    if (min..=max).contains(&t) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTemperature(t))
    }
}

/// Workbench configuration, usually read from a TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub server_url: String,
    pub endpoints: Endpoints,
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub edit_quiet_ms: u64,
    pub reconcile_interval_ms: u64,
    pub completion_sentinel: String,
    pub error_prefix: String,
    pub left: VersionKey,
    pub right: VersionKey,
    pub recognition: RecognitionOptions,
    pub final_document: FinalDocumentOptions,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        let rules = StatusRules::default();
        let bindings = SurfaceBindings::default();
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            endpoints: Endpoints::default(),
            poll_interval_ms: 2000,
            settle_delay_ms: 50,
            edit_quiet_ms: 300,
            reconcile_interval_ms: 1000,
            completion_sentinel: rules.completion_sentinel,
            error_prefix: rules.error_prefix,
            left: bindings.left,
            right: bindings.right,
            recognition: RecognitionOptions::default(),
            final_document: FinalDocumentOptions::default(),
        }
    }
}

impl WorkbenchConfig {
    /// Read a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> WorkbenchResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> WorkbenchResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| WorkbenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject timer settings the session loop cannot run with.
    pub fn validate(&self) -> WorkbenchResult<()> {
        let timers = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("reconcile_interval_ms", self.reconcile_interval_ms),
        ];
        for (name, value) in timers {
            if value == 0 {
                return Err(WorkbenchError::Config(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }

    pub fn status_rules(&self) -> StatusRules {
        StatusRules {
            completion_sentinel: self.completion_sentinel.clone(),
            error_prefix: self.error_prefix.clone(),
        }
    }

    pub fn bindings(&self) -> SurfaceBindings {
        SurfaceBindings::new(self.left, self.right)
    }

    /// Never zero, even for a config built in code without [`validate`](Self::validate).
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn edit_quiet(&self) -> Duration {
        Duration::from_millis(self.edit_quiet_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms.max(1))
    }
}
