//! Release artifact generation
//!
//! Builds every selected variant and compares it with the artifact on disk
//! at `output_root/<metadata output>`. Changed artifacts are rewritten as
//! 2-space pretty JSON unless this is a dry run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use glove80_spec::ErrorCode;

use crate::compose::{ComposeError, Composer};
use crate::document::digest_value;
use crate::metadata::{FamilyMetadata, MetadataError, MetadataTable};

/// What to generate and where
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Families to generate; empty means every registered family.
    pub families: Vec<String>,
    /// Restrict to one variant.
    pub variant: Option<String>,
    /// Per-family metadata file replacing the built-in entries. Needs
    /// exactly one family.
    pub metadata_path: Option<PathBuf>,
    pub output_root: PathBuf,
    pub dry_run: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            families: Vec::new(),
            variant: None,
            metadata_path: None,
            output_root: PathBuf::from("."),
            dry_run: false,
        }
    }
}

/// Outcome for one variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub family: String,
    pub variant: String,
    pub destination: PathBuf,
    /// The artifact differed from (or was missing on) disk.
    pub changed: bool,
    /// Canonical digest of the generated document.
    pub digest: String,
}

/// All results of one generation run, for `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
    pub results: Vec<GenerationResult>,
}

impl GenerationReport {
    pub fn new(dry_run: bool, results: Vec<GenerationResult>) -> Self {
        Self {
            generated_at: Utc::now(),
            dry_run,
            results,
        }
    }

    /// Number of artifacts that are (or were) out of date.
    pub fn changed_count(&self) -> usize {
        self.results.iter().filter(|r| r.changed).count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Generate (or check) release artifacts.
pub fn generate_layouts(
    composer: &Composer,
    options: &GenerateOptions,
) -> Result<Vec<GenerationResult>, GenerateError> {
    let families = select_families(composer, options)?;

    let mut results = Vec::new();
    for family_name in families {
        let family = composer.registry().get(&family_name)?;
        let key = family.metadata_key().to_string();

        let metadata = match &options.metadata_path {
            Some(path) => {
                let loaded = FamilyMetadata::load(&key, path)?;
                debug!(family = %family_name, path = %path.display(), "Using metadata override");
                composer.metadata().clone().with_family(key.as_str(), loaded)
            }
            None => composer.metadata().clone(),
        };
        let Some(family_metadata) = metadata.family(&key) else {
            return Err(ComposeError::UnknownVariantMetadata {
                family: key,
                variant: options.variant.clone().unwrap_or_default(),
            }
            .into());
        };

        let variants: Vec<(String, PathBuf)> = match &options.variant {
            Some(variant) => {
                let meta = family_metadata.get(variant).ok_or_else(|| {
                    ComposeError::UnknownVariant {
                        family: family_name.clone(),
                        variant: variant.clone(),
                        available: family_metadata.names(),
                    }
                })?;
                vec![(variant.clone(), PathBuf::from(&meta.output))]
            }
            None => family_metadata
                .variants()
                .map(|(name, meta)| (name.to_string(), PathBuf::from(&meta.output)))
                .collect(),
        };

        for (variant, output) in variants {
            let result = generate_variant(
                composer,
                &metadata,
                &family_name,
                &variant,
                &options.output_root.join(output),
                options.dry_run,
            )?;
            results.push(result);
        }
    }
    Ok(results)
}

fn select_families(
    composer: &Composer,
    options: &GenerateOptions,
) -> Result<Vec<String>, GenerateError> {
    if options.metadata_path.is_some() && options.families.len() != 1 {
        return Err(GenerateError::MetadataRequiresFamily);
    }
    if options.families.is_empty() {
        return Ok(composer
            .registry()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect());
    }
    for family in &options.families {
        composer.registry().get(family)?;
    }
    Ok(options.families.clone())
}

fn generate_variant(
    composer: &Composer,
    metadata: &MetadataTable,
    family: &str,
    variant: &str,
    destination: &Path,
    dry_run: bool,
) -> Result<GenerationResult, GenerateError> {
    let document = composer.build_value_with_metadata(family, variant, metadata)?;
    let digest = digest_value(&document)?;

    let changed = match read_artifact(destination)? {
        Some(current) => current != document,
        None => true,
    };

    if !changed {
        debug!(family, variant, path = %destination.display(), "Artifact unchanged");
    } else if dry_run {
        warn!(family, variant, path = %destination.display(), "Artifact is stale");
    } else {
        write_artifact(destination, &document)?;
        info!(family, variant, path = %destination.display(), "Wrote artifact");
    }

    Ok(GenerationResult {
        family: family.to_string(),
        variant: variant.to_string(),
        destination: destination.to_path_buf(),
        changed,
        digest,
    })
}

fn read_artifact(path: &Path) -> Result<Option<Value>, GenerateError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&contents).map_err(|source| GenerateError::InvalidArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Write-then-rename so a failed run never leaves a truncated artifact.
fn write_artifact(path: &Path, document: &Value) -> Result<(), GenerateError> {
    let io_err = |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(document)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json).map_err(io_err)?;
    fs::rename(&temp_path, path).map_err(io_err)?;
    Ok(())
}

/// Generation errors
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Existing artifact {} is not valid JSON: {source}", path.display())]
    InvalidArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("--metadata requires exactly one --family")]
    MetadataRequiresFamily,
}

impl GenerateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GenerateError::Compose(err) => err.code(),
            GenerateError::Metadata(err) => err.code(),
            GenerateError::Io { .. } => ErrorCode::IoError,
            GenerateError::InvalidArtifact { .. } | GenerateError::Json(_) => ErrorCode::JsonError,
            GenerateError::MetadataRequiresFamily => ErrorCode::ConfigError,
        }
    }
}
