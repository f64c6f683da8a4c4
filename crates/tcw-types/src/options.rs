use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Project account selector forwarded to the remote services.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectMode {
    #[default]
    #[serde(rename = "RA")]
    Ra,
    #[serde(rename = "GL")]
    Gl,
}

impl ProjectMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ra => "RA",
            Self::Gl => "GL",
        }
    }
}

impl fmt::Display for ProjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RA" => Ok(Self::Ra),
            "GL" => Ok(Self::Gl),
            _ => Err(TypeError::UnknownMode(s.to_string())),
        }
    }
}

/// Which prompt the final-document generator uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptKind {
    #[serde(rename = "prompt-tei-gl")]
    Gl,
    #[default]
    #[serde(rename = "prompt-tei-ra")]
    Ra,
    /// Free-text prompt supplied by the user.
    #[serde(rename = "prompt-tei-custom")]
    Custom,
}

impl PromptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gl => "prompt-tei-gl",
            Self::Ra => "prompt-tei-ra",
            Self::Custom => "prompt-tei-custom",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt-tei-gl" | "gl" => Ok(Self::Gl),
            "prompt-tei-ra" | "ra" => Ok(Self::Ra),
            "prompt-tei-custom" | "custom" => Ok(Self::Custom),
            _ => Err(TypeError::UnknownPrompt(s.to_string())),
        }
    }
}
