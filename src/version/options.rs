//! Version tool options and the cache key derived from them

use clap::Args;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Options forwarded to the version tool
///
/// Values are passed through untouched; the tool decides whether they are
/// valid.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionOptions {
    /// Version part to bump after the latest tag: major, minor or patch
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<String>,

    /// Build metadata appended to the version
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_metadata: Option<String>,

    /// Pre-release identifiers used when the height is above zero
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pre_release_identifiers: Option<String>,

    /// Pre-release phase used when the height is above zero
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pre_release_phase: Option<String>,

    /// Ignore commit height ("true" to enable)
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_height: Option<String>,

    /// Minimum major.minor version
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_major_minor: Option<String>,

    /// Prefix of version tags, e.g. "v"
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,

    /// Tool verbosity: quiet, minimal, normal, detailed, diagnostic (or q, m, n, d, diag)
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,

    /// Use this version instead of calculating one
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_override: Option<String>,

    /// Directory to run the tool in (defaults to the current directory)
    #[arg(short = 'C', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl VersionOptions {
    /// Fill unset options from `defaults`
    pub fn with_defaults(&self, defaults: &VersionOptions) -> VersionOptions {
        fn pick<T: Clone>(own: &Option<T>, fallback: &Option<T>) -> Option<T> {
            own.clone().or_else(|| fallback.clone())
        }

        VersionOptions {
            auto_increment: pick(&self.auto_increment, &defaults.auto_increment),
            build_metadata: pick(&self.build_metadata, &defaults.build_metadata),
            default_pre_release_identifiers: pick(
                &self.default_pre_release_identifiers,
                &defaults.default_pre_release_identifiers,
            ),
            default_pre_release_phase: pick(
                &self.default_pre_release_phase,
                &defaults.default_pre_release_phase,
            ),
            ignore_height: pick(&self.ignore_height, &defaults.ignore_height),
            minimum_major_minor: pick(&self.minimum_major_minor, &defaults.minimum_major_minor),
            tag_prefix: pick(&self.tag_prefix, &defaults.tag_prefix),
            verbosity: pick(&self.verbosity, &defaults.verbosity),
            version_override: pick(&self.version_override, &defaults.version_override),
            work_dir: pick(&self.work_dir, &defaults.work_dir),
        }
    }

    /// Whether `--ignore-height` should be passed
    pub fn ignores_height(&self) -> bool {
        self.ignore_height
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Tool arguments, one flag per option.
    ///
    /// Unset options are passed as empty strings so the tool applies its own
    /// default. `--ignore-height` is a bare switch.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(18);

        push_flag(&mut args, "--auto-increment", &self.auto_increment);
        push_flag(&mut args, "--build-metadata", &self.build_metadata);
        push_flag(
            &mut args,
            "--default-pre-release-identifiers",
            &self.default_pre_release_identifiers,
        );
        push_flag(
            &mut args,
            "--default-pre-release-phase",
            &self.default_pre_release_phase,
        );

        if self.ignores_height() {
            args.push("--ignore-height".to_string());
        }

        push_flag(&mut args, "--minimum-major-minor", &self.minimum_major_minor);
        push_flag(&mut args, "--tag-prefix", &self.tag_prefix);
        push_flag(&mut args, "--verbosity", &self.verbosity);
        push_flag(&mut args, "--version-override", &self.version_override);

        args
    }

    /// Cache key covering every option that can change the tool's result
    pub fn cache_key(&self) -> VersionKey {
        VersionKey {
            fields: [
                self.auto_increment.clone(),
                self.build_metadata.clone(),
                self.default_pre_release_identifiers.clone(),
                self.default_pre_release_phase.clone(),
                self.ignore_height.clone(),
                self.minimum_major_minor.clone(),
                self.tag_prefix.clone(),
                self.verbosity.clone(),
                self.version_override.clone(),
            ],
            work_dir: self.work_dir.clone(),
        }
    }
}

/// Ordered composite of version options
///
/// Two keys are equal only when every field is equal, and an unset field
/// never equals a field set to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey {
    fields: [Option<String>; 9],
    work_dir: Option<PathBuf>,
}

impl VersionKey {
    /// Short content hash of the key, for logs and reports (first 12 hex chars)
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for field in &self.fields {
            hash_optional(&mut hasher, field.as_deref().map(str::as_bytes));
        }
        let dir = self.work_dir.as_ref().map(|p| p.to_string_lossy());
        hash_optional(&mut hasher, dir.as_deref().map(str::as_bytes));

        let result = hasher.finalize();
        hex::encode(&result[..6])
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: &Option<String>) {
    args.push(flag.to_string());
    args.push(value.clone().unwrap_or_default());
}

/// Hash a possibly-absent field with a presence marker and length prefix
fn hash_optional(hasher: &mut Sha256, bytes: Option<&[u8]>) {
    match bytes {
        None => hasher.update([0u8]),
        Some(bytes) => {
            hasher.update([1u8]);
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
    }
}
