use super::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File name looked up next to the executable
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Model fetched by `fetch-model` when the config names none
pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-small-en-v1.5";

/// How token embeddings are reduced to one sentence vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    /// First token (BGE-style models)
    #[default]
    Cls,
    /// Mean over all tokens (sentence-transformers style models)
    Mean,
}

/// Compute backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    /// CUDA when available, CPU otherwise
    #[default]
    Auto,
    Cpu,
}

/// On-disk shape of `config.yaml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    exclude_dirs: Vec<String>,
    include_exts: Vec<String>,
    model_dir: Option<PathBuf>,
    model_id: Option<String>,
    pooling: Pooling,
    device: DeviceChoice,
    label_prefix: String,
    document_prefix: String,
    include_hidden: bool,
}

/// Configuration for folder2vec, loaded once per run
#[derive(Debug, Clone)]
pub struct Config {
    /// Bare directory names pruned from traversal and file eligibility
    pub exclude_dirs: BTreeSet<String>,
    /// Dot-prefixed, lowercased extensions eligible for classification
    pub include_exts: BTreeSet<String>,
    /// Directory holding config.json, tokenizer.json and model.safetensors
    pub model_dir: PathBuf,
    /// HuggingFace repository used by `fetch-model`
    pub model_id: String,
    pub pooling: Pooling,
    pub device: DeviceChoice,
    /// Prepended to every directory label before embedding
    pub label_prefix: String,
    /// Prepended to every file's text before embedding
    pub document_prefix: String,
    /// Whether dot-prefixed files, and files under dot-prefixed directories,
    /// are eligible for classification. Hidden directories are always
    /// catalogued unless excluded.
    pub include_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default(), Path::new("."))
    }
}

impl Config {
    /// `config.yaml` adjacent to the running executable
    pub fn default_path() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| Error::Config("Could not determine executable directory".to_string()))?;
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Load and validate a config file. Missing or malformed files are fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_yaml_str(&content, base_dir)
    }

    /// Parse YAML text; relative `model_dir` values resolve against `base_dir`.
    pub fn from_yaml_str(content: &str, base_dir: &Path) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content)?
        };
        Ok(Self::from_file(file, base_dir))
    }

    fn from_file(file: ConfigFile, base_dir: &Path) -> Self {
        let exclude_dirs = file
            .exclude_dirs
            .iter()
            .map(|d| d.trim_end_matches(['/', '\\']).to_string())
            .filter(|d| !d.is_empty())
            .collect();

        let include_exts = file
            .include_exts
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| e.len() > 1)
            .collect();

        let model_id = file.model_id.unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
        let model_dir = match file.model_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => base_dir.join(dir),
            None => base_dir.join("models").join(model_name(&model_id)),
        };

        Self {
            exclude_dirs,
            include_exts,
            model_dir,
            model_id,
            pooling: file.pooling,
            device: file.device,
            label_prefix: file.label_prefix,
            document_prefix: file.document_prefix,
            include_hidden: file.include_hidden,
        }
    }

    /// Exact bare-name match against the exclusion list
    pub fn is_excluded_name(&self, name: &str) -> bool {
        self.exclude_dirs.contains(name)
    }

    /// Whether the path's extension is in `include_exts` (case-insensitive)
    pub fn is_included_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.include_exts.contains(&format!(".{}", ext.to_lowercase())))
            .unwrap_or(false)
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Last path segment of a hub id, e.g. "BAAI/bge-small-en-v1.5" -> "bge-small-en-v1.5"
fn model_name(model_id: &str) -> &str {
    model_id.rsplit('/').next().unwrap_or(model_id)
}
