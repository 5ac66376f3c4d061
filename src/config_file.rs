use crate::config::ConfigBuilder;
use crate::error::{config_error, IntoSubproseError, Result, SubproseError};
use crate::filler::DEFAULT_FILLER_WORDS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file format that can be serialized to YAML/JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Length a line must exceed before it may end on a terminator
    pub min_line_length: Option<usize>,
    /// Disfluency vocabulary
    pub filler_words: Option<Vec<String>>,
    /// Trailing marks ignored when matching fillers
    pub strip_suffixes: Option<Vec<char>>,
    /// Characters that end a sentence
    pub terminators: Option<Vec<char>>,
    /// Marker for bleeped words
    pub censor_placeholder: Option<String>,
    /// Default output directory
    pub output_directory: Option<PathBuf>,
    /// Enable progress indicators by default
    pub show_progress: Option<bool>,
    /// Named profiles
    pub profiles: Option<HashMap<String, ProfileConfig>>,
}

/// Profile-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub min_line_length: Option<usize>,
    pub filler_words: Option<Vec<String>>,
    pub strip_suffixes: Option<Vec<char>>,
    pub terminators: Option<Vec<char>>,
    pub censor_placeholder: Option<String>,
    pub description: Option<String>,
}

const SUPPORTED_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

async fn read_config_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).await.with_path(path)
}

fn format_error(action: &str, err: impl std::fmt::Display) -> SubproseError {
    config_error("config_file", format!("Failed to {} config: {}", action, err))
}

impl Default for ConfigFile {
    fn default() -> Self {
        let mut profiles = HashMap::new();

        profiles.insert("minimal".to_string(), ProfileConfig {
            min_line_length: None,
            filler_words: Some(words(&["um", "uh"])),
            strip_suffixes: Some(Vec::new()),
            terminators: None,
            censor_placeholder: None,
            description: Some("Just 'um' and 'uh', without trailing punctuation tolerance".to_string()),
        });

        profiles.insert("standard".to_string(), ProfileConfig {
            min_line_length: None,
            filler_words: Some(words(DEFAULT_FILLER_WORDS)),
            strip_suffixes: None,
            terminators: None,
            censor_placeholder: None,
            description: Some("Default disfluency vocabulary".to_string()),
        });

        let mut extended = words(DEFAULT_FILLER_WORDS);
        extended.extend(words(&["hm", "mmm", "uh-huh", "ahh", "ehm", "huh"]));
        profiles.insert("verbose-speech".to_string(), ProfileConfig {
            min_line_length: Some(60),
            filler_words: Some(extended),
            strip_suffixes: None,
            terminators: Some(vec!['.', '?', '!']),
            censor_placeholder: None,
            description: Some("Extended vocabulary and longer lines for rambling speakers".to_string()),
        });

        Self {
            min_line_length: None,
            filler_words: None, // Use defaults
            strip_suffixes: None,
            terminators: None,
            censor_placeholder: None,
            output_directory: None,
            show_progress: Some(true),
            profiles: Some(profiles),
        }
    }
}

impl ConfigFile {
    /// Load configuration from a YAML file
    pub async fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = read_config_text(path.as_ref()).await?;
        serde_yaml::from_str(&contents).map_err(|e| format_error("parse YAML", e))
    }

    /// Load configuration from a JSON file
    pub async fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = read_config_text(path.as_ref()).await?;
        serde_json::from_str(&contents).map_err(|e| format_error("parse JSON", e))
    }

    /// Auto-detect and load configuration file based on extension
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::load_yaml(path).await,
            Some("json") => Self::load_json(path).await,
            Some(ext) => Err(SubproseError::UnsupportedFormat {
                extension: ext.to_string(),
                supported: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            }),
            None => Err(config_error(
                "config_file",
                "Config file must have .yaml, .yml, or .json extension",
            )),
        }
    }

    /// Save configuration to YAML file
    pub async fn save_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml_content = serde_yaml::to_string(self).map_err(|e| format_error("serialize YAML", e))?;
        fs::write(path.as_ref(), yaml_content).await.with_path(path.as_ref())
    }

    /// Save configuration to JSON file
    pub async fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_content =
            serde_json::to_string_pretty(self).map_err(|e| format_error("serialize JSON", e))?;
        fs::write(path.as_ref(), json_content).await.with_path(path.as_ref())
    }

    /// Get default config file paths to search
    pub fn default_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(".subprose.yaml"),
            PathBuf::from(".subprose.yml"),
            PathBuf::from(".subprose.json"),
            dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
                .join("subprose").join("config.yaml"),
            dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
                .join(".config").join("subprose.yaml"),
        ]
    }

    /// Try to load configuration from default locations
    pub async fn load_from_default_locations() -> Option<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::load(&path).await {
                    Ok(config) => {
                        log::info!("Loaded configuration from: {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }

    /// Apply this config file to a ConfigBuilder
    pub fn apply_to_builder(&self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        if let Some(length) = self.min_line_length {
            builder = builder.min_line_length(length)?;
        }

        if let Some(ref words) = self.filler_words {
            builder = builder.filler_words(words.clone())?;
        }

        if let Some(ref suffixes) = self.strip_suffixes {
            builder = builder.strip_suffixes(suffixes.clone());
        }

        if let Some(ref terminators) = self.terminators {
            builder = builder.terminators(terminators.clone())?;
        }

        if let Some(ref placeholder) = self.censor_placeholder {
            builder = builder.censor_placeholder(placeholder.clone())?;
        }

        if let Some(ref dir) = self.output_directory {
            builder = builder.output_dir(dir.clone());
        }

        Ok(builder)
    }

    /// Apply a specific profile to a ConfigBuilder
    pub fn apply_profile_to_builder(&self, profile_name: &str, builder: ConfigBuilder) -> Result<ConfigBuilder> {
        let profile = self.resolve_profile(profile_name)?;

        // First apply base config, then override with profile
        let mut builder = self.apply_to_builder(builder)?;

        if let Some(length) = profile.min_line_length {
            builder = builder.min_line_length(length)?;
        }

        if let Some(ref words) = profile.filler_words {
            builder = builder.filler_words(words.clone())?;
        }

        if let Some(ref suffixes) = profile.strip_suffixes {
            builder = builder.strip_suffixes(suffixes.clone());
        }

        if let Some(ref terminators) = profile.terminators {
            builder = builder.terminators(terminators.clone())?;
        }

        if let Some(ref placeholder) = profile.censor_placeholder {
            builder = builder.censor_placeholder(placeholder.clone())?;
        }

        Ok(builder)
    }

    /// Look up a profile by name
    pub fn profile(&self, profile_name: &str) -> Result<&ProfileConfig> {
        let profiles = self
            .profiles
            .as_ref()
            .ok_or_else(|| config_error("profiles", "No profiles defined"))?;

        profiles
            .get(profile_name)
            .ok_or_else(|| config_error("profile", format!("Profile '{}' not found", profile_name)))
    }

    /// Look up a profile, falling back to the built-in ones
    pub fn resolve_profile(&self, profile_name: &str) -> Result<ProfileConfig> {
        if let Ok(profile) = self.profile(profile_name) {
            return Ok(profile.clone());
        }
        ConfigFile::default()
            .profile(profile_name)
            .cloned()
            .map_err(|_| config_error("profile", format!("Profile '{}' not found", profile_name)))
    }

    /// Profiles defined here plus the built-in ones they do not shadow, sorted by name
    pub fn available_profiles(&self) -> Vec<(String, ProfileConfig)> {
        let mut merged = ConfigFile::default().profiles.unwrap_or_default();
        if let Some(own) = &self.profiles {
            merged.extend(own.iter().map(|(name, profile)| (name.clone(), profile.clone())));
        }
        let mut profiles: Vec<(String, ProfileConfig)> = merged.into_iter().collect();
        profiles.sort_by(|a, b| a.0.cmp(&b.0));
        profiles
    }

    /// List profiles defined in this file, sorted by name
    pub fn list_profiles(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles
            .as_ref()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}
