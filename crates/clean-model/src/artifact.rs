//! Artifact references, descriptors, and handles.
//!
//! An artifact is an immutable, named, versioned file blob. Versions are
//! numbered from zero (`v0`, `v1`, ...) and the `latest` alias always points at
//! the highest version of a name.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, Result};

/// Alias used when a reference carries no explicit version.
pub const LATEST_ALIAS: &str = "latest";

/// Version selector of an artifact reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactAlias {
    Latest,
    Version(u32),
}

impl fmt::Display for ArtifactAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactAlias::Latest => f.write_str(LATEST_ALIAS),
            ArtifactAlias::Version(version) => write!(f, "v{version}"),
        }
    }
}

/// Parsed `name[:alias]` reference to an artifact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
    pub alias: ArtifactAlias,
}

impl ArtifactRef {
    /// Parse a reference such as `sample.csv`, `sample.csv:latest`, or `sample.csv:v3`.
    pub fn parse(reference: &str) -> Result<Self> {
        let trimmed = reference.trim();
        let invalid = |reason: &str| ModelError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(invalid("reference is empty"));
        }
        let (name, alias) = match trimmed.rsplit_once(':') {
            Some((name, alias)) => (name, parse_alias(alias).ok_or_else(|| {
                invalid("alias must be 'latest' or 'v<N>'")
            })?),
            None => (trimmed, ArtifactAlias::Latest),
        };
        if let Err(reason) = check_identifier(name) {
            return Err(invalid(&reason));
        }
        Ok(Self {
            name: name.to_string(),
            alias,
        })
    }

    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: ArtifactAlias::Latest,
        }
    }

    pub fn version(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            alias: ArtifactAlias::Version(version),
        }
    }
}

impl FromStr for ArtifactRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.alias)
    }
}

fn parse_alias(alias: &str) -> Option<ArtifactAlias> {
    if alias == LATEST_ALIAS {
        return Some(ArtifactAlias::Latest);
    }
    let digits = alias.strip_prefix('v')?;
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(ArtifactAlias::Version)
}

/// Validate an artifact name or type tag.
///
/// Identifiers may contain ASCII letters, digits, `.`, `_`, and `-`, and must
/// not be a relative path component.
fn check_identifier(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value == "." || value == ".." {
        return Err("must not be a path component".to_string());
    }
    if let Some(bad) = value
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')))
    {
        return Err(format!("contains unsupported character '{bad}'"));
    }
    Ok(())
}

/// Name, type, and description used to create a new artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub description: String,
}

impl ArtifactDescriptor {
    /// Build a descriptor, validating the name and type tag.
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let descriptor = Self {
            name: name.into(),
            artifact_type: artifact_type.into(),
            description: description.into(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn validate(&self) -> Result<()> {
        check_identifier(&self.name).map_err(|reason| ModelError::InvalidDescriptor {
            field: "name",
            value: self.name.clone(),
            reason,
        })?;
        check_identifier(&self.artifact_type).map_err(|reason| ModelError::InvalidDescriptor {
            field: "type",
            value: self.artifact_type.clone(),
            reason,
        })
    }
}

/// One published, immutable artifact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle {
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub version: u32,
    pub description: String,
    /// File name of the single content blob.
    pub file_name: String,
    /// Hex-encoded SHA-256 of the blob.
    pub digest: String,
    pub size: u64,
    /// Run that produced this version, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ArtifactHandle {
    /// Pinned reference to exactly this version.
    pub fn reference(&self) -> ArtifactRef {
        ArtifactRef::version(self.name.clone(), self.version)
    }

    /// `name:vN` form used in logs and lineage.
    pub fn qualified_name(&self) -> String {
        self.reference().to_string()
    }
}
