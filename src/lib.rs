// Core modules
pub mod config;
pub mod config_file;
pub mod error;
pub mod filler;
pub mod pipeline;
pub mod progress;
pub mod reflow;
pub mod resources;
pub mod splitter;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, OutputPaths, Stage};
pub use config_file::{ConfigFile, ProfileConfig};
pub use error::{Result, SubproseError};
pub use filler::FillerSet;
pub use pipeline::FileReport;
pub use progress::ProgressTracker;
pub use reflow::{reflow, ReflowConfig, ReflowOutput, ReflowSink, ReflowStats, SentenceReflower};
pub use resources::StagedFile;
pub use splitter::{BlockSplitter, SplitOutput, SplitSink, SplitStats};
