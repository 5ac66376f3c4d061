//! File-level drivers for the split and reflow stages.
//!
//! Each stage reads its whole input, streams results into staged output
//! files and only commits them once the pass completed. Both outputs of a
//! stage are flushed before either is renamed into place, so a read or
//! write fault leaves neither behind. The renames themselves are two steps:
//! if the second one fails, the first output has already landed.
//! Files are independent and may run in parallel; the stages of one file
//! never do.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use log::{error, info};
use tokio::task::JoinSet;

use crate::config::{Config, OutputPaths, Stage};
use crate::error::{IntoSubproseError, Result, SubproseError};
use crate::progress::ProgressTracker;
use crate::reflow::{ReflowConfig, ReflowSink, ReflowStats, SentenceReflower};
use crate::resources::StagedFile;
use crate::splitter::{BlockSplitter, SplitSink, SplitStats};

/// What one input produced
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub input: PathBuf,
    pub split: Option<SplitStats>,
    pub reflow: Option<ReflowStats>,
    pub outputs: Vec<PathBuf>,
}

/// Pair of staged outputs receiving either splitter or reflow results
struct StagedPair<'a> {
    first: &'a mut StagedFile,
    second: &'a mut StagedFile,
}

fn write_line(file: &mut StagedFile, line: &str) -> Result<()> {
    use std::io::Write;
    let destination = file.destination().to_path_buf();
    writeln!(file, "{}", line).with_path(destination)
}

impl SplitSink for StagedPair<'_> {
    fn metadata(&mut self, index_line: &str, timing_line: &str) -> Result<()> {
        write_line(self.first, index_line)?;
        write_line(self.first, timing_line)
    }

    fn text(&mut self, line: &str) -> Result<()> {
        write_line(self.second, line)
    }
}

impl ReflowSink for StagedPair<'_> {
    fn sentence(&mut self, line: &str) -> Result<()> {
        write_line(self.first, line)
    }

    fn disfluency(&mut self, word: &str) -> Result<()> {
        write_line(self.second, word)
    }
}

/// Flush both staged outputs, then move them into place
fn commit_pair(mut first: StagedFile, mut second: StagedFile) -> Result<()> {
    use std::io::Write;
    for file in [&mut first, &mut second] {
        let destination = file.destination().to_path_buf();
        file.flush().with_path(destination)?;
    }
    first.commit()?;
    second.commit()?;
    Ok(())
}

/// Read a whole input file, dropping a leading byte order mark
pub fn read_source(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).with_path(path)?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Split a subtitle file into a metadata file and a text file
pub fn split_file(input: &Path, metadata_path: &Path, text_path: &Path) -> Result<SplitStats> {
    let content = read_source(input)?;

    let mut metadata = StagedFile::create(metadata_path)?;
    let mut text = StagedFile::create(text_path)?;
    let stats = BlockSplitter::new().split_into(
        content.lines(),
        &mut StagedPair {
            first: &mut metadata,
            second: &mut text,
        },
    )?;
    commit_pair(metadata, text)?;

    info!(
        "Split {:?}: {} blocks, {} text lines",
        input, stats.blocks, stats.text_lines
    );
    Ok(stats)
}

/// Reflow a text file into a sentence file and a disfluency log
pub fn reflow_file(
    input: &Path,
    sentences_path: &Path,
    disfluency_path: &Path,
    config: &ReflowConfig,
) -> Result<ReflowStats> {
    let content = read_source(input)?;

    let mut sentences = StagedFile::create(sentences_path)?;
    let mut disfluencies = StagedFile::create(disfluency_path)?;
    let stats = {
        let mut reflower = SentenceReflower::new(
            config,
            StagedPair {
                first: &mut sentences,
                second: &mut disfluencies,
            },
        );
        reflower.push_str(&content)?;
        let (_, stats) = reflower.finish()?;
        stats
    };
    commit_pair(sentences, disfluencies)?;

    info!(
        "Reflowed {:?}: {} lines, {} fillers removed",
        input, stats.lines, stats.fillers_removed
    );
    Ok(stats)
}

/// Run the configured stages for one input
pub fn process_file(
    input: &Path,
    paths: &OutputPaths,
    config: &Config,
    progress: &ProgressTracker,
) -> Result<FileReport> {
    let name = input.display().to_string();
    let mut report = FileReport {
        input: input.to_path_buf(),
        ..Default::default()
    };

    if matches!(config.stage, Stage::Split | Stage::All) {
        let stats = progress.with_spinner(&format!("Splitting {}", name), || {
            split_file(input, &paths.metadata, &paths.text)
        })?;
        report.split = Some(stats);
        report.outputs.push(paths.metadata.clone());
        report.outputs.push(paths.text.clone());
    }

    if matches!(config.stage, Stage::Reflow | Stage::All) {
        let source = match config.stage {
            Stage::All => paths.text.as_path(),
            _ => input,
        };
        let reflow_config = config.reflow_config();
        let stats = progress.with_spinner(&format!("Reflowing {}", name), || {
            reflow_file(source, &paths.sentences, &paths.disfluencies, &reflow_config)
        })?;
        report.reflow = Some(stats);
        report.outputs.push(paths.sentences.clone());
        report.outputs.push(paths.disfluencies.clone());
    }

    Ok(report)
}

/// Process every configured input, one blocking task per file.
///
/// A failing file does not stop the others; the run fails afterwards if
/// any file did.
pub async fn run(config: Arc<Config>, progress: ProgressTracker) -> Result<Vec<FileReport>> {
    let planned = config.planned_outputs()?;
    let files_bar = progress.files_bar(config.input_files.len() as u64);
    let mut tasks = JoinSet::new();

    for (position, (input, paths)) in config.input_files.iter().cloned().zip(planned).enumerate() {
        let config = Arc::clone(&config);
        let progress = progress.clone();
        tasks.spawn_blocking(move || {
            let result = process_file(&input, &paths, &config, &progress);
            (position, input, result)
        });
    }

    let mut reports = Vec::new();
    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        let (position, input, result) = joined.context("File worker did not complete")?;
        files_bar.inc(1);
        match result {
            Ok(report) => reports.push((position, report)),
            Err(e) => {
                error!("Failed to process {:?}: {}", input, e);
                failures += 1;
            }
        }
    }
    files_bar.finish_and_clear();

    if failures > 0 {
        return Err(SubproseError::Processing {
            message: format!("{} of {} files failed", failures, config.input_files.len()),
        });
    }

    reports.sort_by_key(|(position, _)| *position);
    Ok(reports.into_iter().map(|(_, report)| report).collect())
}
