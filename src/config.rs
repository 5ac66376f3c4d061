use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{config_error, Result, SubproseError};
use crate::filler::{FillerSet, DEFAULT_FILLER_WORDS, DEFAULT_STRIP_SUFFIXES};
use crate::reflow::{
    ReflowConfig, DEFAULT_CENSOR_PLACEHOLDER, DEFAULT_MIN_LINE_LENGTH, DEFAULT_TERMINATORS,
};

/// Which part of the pipeline to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Subtitle file -> metadata + text
    Split,
    /// Plain text -> sentences + disfluency log
    Reflow,
    /// Split, then reflow the produced text
    All,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Split => "split",
            Stage::Reflow => "reflow",
            Stage::All => "all",
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = SubproseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "split" => Ok(Stage::Split),
            "reflow" => Ok(Stage::Reflow),
            "all" => Ok(Stage::All),
            _ => Err(config_error(
                "stage",
                format!("Invalid stage '{}'. Valid options: split, reflow, all", s),
            )),
        }
    }
}

/// Files written for one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub metadata: PathBuf,
    pub text: PathBuf,
    pub sentences: PathBuf,
    pub disfluencies: PathBuf,
}

/// Configuration structure for a subprose run
#[derive(Debug, Clone)]
pub struct Config {
    pub input_files: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub stage: Stage,
    pub min_line_length: usize,
    pub filler_words: Vec<String>,
    pub strip_suffixes: Vec<char>,
    pub terminators: Vec<char>,
    pub censor_placeholder: String,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.input_files.is_empty() {
            return Err(config_error("input_files", "At least one input file is required"));
        }

        for input in &self.input_files {
            if !input.exists() {
                return Err(config_error(
                    "input_files",
                    format!("Input file does not exist: {}", input.display()),
                ));
            }
            if !input.is_file() {
                return Err(config_error(
                    "input_files",
                    format!("Input path is not a file: {}", input.display()),
                ));
            }
        }

        if let Some(dir) = &self.output_dir {
            if !dir.is_dir() {
                return Err(config_error(
                    "output_dir",
                    format!("Output directory does not exist: {}", dir.display()),
                ));
            }
        }

        if self.min_line_length == 0 {
            return Err(config_error("min_line_length", "Minimum line length must be positive"));
        }

        if self.reflow_config().fillers.is_empty() {
            return Err(config_error("filler_words", "Filler word list cannot be empty"));
        }

        if self.terminators.is_empty() {
            return Err(config_error("terminators", "At least one sentence terminator is required"));
        }

        if self.censor_placeholder.trim().is_empty() {
            return Err(config_error("censor_placeholder", "Censor placeholder cannot be empty"));
        }

        Ok(())
    }

    /// Reflow settings derived from this configuration
    pub fn reflow_config(&self) -> ReflowConfig {
        ReflowConfig {
            fillers: FillerSet::with_strip_suffixes(&self.filler_words, self.strip_suffixes.clone()),
            min_line_length: self.min_line_length,
            terminators: self.terminators.clone(),
            censor_placeholder: self.censor_placeholder.clone(),
        }
    }

    /// Derive output file names for `input`.
    ///
    /// Outputs sit next to the input (or in `output_dir`) and share its stem:
    /// `.meta`, `.txt`, `.lines` and `.fillers`.
    pub fn output_paths(&self, input: &Path) -> Result<OutputPaths> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| config_error("input_files", format!("Invalid filename: {}", input.display())))?;

        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        let paths = OutputPaths {
            metadata: dir.join(format!("{}.meta", stem)),
            text: dir.join(format!("{}.txt", stem)),
            sentences: dir.join(format!("{}.lines", stem)),
            disfluencies: dir.join(format!("{}.fillers", stem)),
        };

        let written: Vec<&PathBuf> = match self.stage {
            Stage::Split => vec![&paths.metadata, &paths.text],
            Stage::Reflow => vec![&paths.sentences, &paths.disfluencies],
            Stage::All => vec![&paths.metadata, &paths.text, &paths.sentences, &paths.disfluencies],
        };
        if written.iter().any(|p| p.as_path() == input) {
            return Err(config_error(
                "input_files",
                format!(
                    "Output for stage '{}' would overwrite input {}",
                    self.stage.as_str(),
                    input.display()
                ),
            ));
        }

        Ok(paths)
    }

    /// Output paths for every input, in input order.
    ///
    /// Fails when two inputs would write the same file, as inputs sharing a
    /// stem do.
    pub fn planned_outputs(&self) -> Result<Vec<OutputPaths>> {
        let mut claimed = HashSet::new();
        let mut planned = Vec::with_capacity(self.input_files.len());

        for input in &self.input_files {
            let paths = self.output_paths(input)?;
            for path in [&paths.metadata, &paths.text, &paths.sentences, &paths.disfluencies] {
                if !claimed.insert(path.clone()) {
                    return Err(config_error(
                        "input_files",
                        format!("Output {} is claimed by more than one input", path.display()),
                    ));
                }
            }
            planned.push(paths);
        }

        Ok(planned)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            output_dir: None,
            stage: Stage::All,
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
            filler_words: DEFAULT_FILLER_WORDS.iter().map(|w| w.to_string()).collect(),
            strip_suffixes: DEFAULT_STRIP_SUFFIXES.to_vec(),
            terminators: DEFAULT_TERMINATORS.to_vec(),
            censor_placeholder: DEFAULT_CENSOR_PLACEHOLDER.to_string(),
        }
    }
}

/// Builder pattern for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    input_files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    stage: Option<Stage>,
    min_line_length: Option<usize>,
    filler_words: Option<Vec<String>>,
    strip_suffixes: Option<Vec<char>>,
    terminators: Option<Vec<char>>,
    censor_placeholder: Option<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_file(mut self, path: PathBuf) -> Self {
        self.input_files.push(path);
        self
    }

    pub fn input_files(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.input_files.extend(paths);
        self
    }

    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn min_line_length(mut self, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(config_error("min_line_length", "Minimum line length must be positive"));
        }
        self.min_line_length = Some(length);
        Ok(self)
    }

    pub fn filler_words(mut self, words: Vec<String>) -> Result<Self> {
        let normalized_words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        if normalized_words.is_empty() {
            return Err(config_error("filler_words", "No valid filler words provided"));
        }

        self.filler_words = Some(normalized_words);
        Ok(self)
    }

    pub fn strip_suffixes(mut self, suffixes: Vec<char>) -> Self {
        self.strip_suffixes = Some(suffixes);
        self
    }

    pub fn terminators(mut self, terminators: Vec<char>) -> Result<Self> {
        if terminators.is_empty() {
            return Err(config_error("terminators", "At least one sentence terminator is required"));
        }
        self.terminators = Some(terminators);
        Ok(self)
    }

    pub fn censor_placeholder(mut self, placeholder: impl Into<String>) -> Result<Self> {
        let placeholder = placeholder.into();
        if placeholder.trim().is_empty() {
            return Err(config_error("censor_placeholder", "Censor placeholder cannot be empty"));
        }
        self.censor_placeholder = Some(placeholder);
        Ok(self)
    }

    /// Assemble the configuration without validating it
    pub fn preview(self) -> Config {
        let defaults = Config::default();
        Config {
            input_files: self.input_files,
            output_dir: self.output_dir,
            stage: self.stage.unwrap_or(defaults.stage),
            min_line_length: self.min_line_length.unwrap_or(defaults.min_line_length),
            filler_words: self.filler_words.unwrap_or(defaults.filler_words),
            strip_suffixes: self.strip_suffixes.unwrap_or(defaults.strip_suffixes),
            terminators: self.terminators.unwrap_or(defaults.terminators),
            censor_placeholder: self.censor_placeholder.unwrap_or(defaults.censor_placeholder),
        }
    }

    pub fn build(self) -> Result<Config> {
        let config = self.preview();

        config.validate()?;
        config.planned_outputs()?;

        Ok(config)
    }
}
