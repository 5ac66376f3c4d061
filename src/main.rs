use clap::{Arg, ArgAction, Command};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use subprose::{pipeline, Config, ConfigBuilder, ConfigFile, FillerSet, ProgressTracker, Result, Stage};

fn build_cli() -> Command {
    Command::new("subprose")
        .about("Turns subtitle transcripts into clean, sentence-per-line prose")
        .version("0.1.0")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input file to process (repeatable)")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("stage")
                .long("stage")
                .value_name("STAGE")
                .help("Pipeline stage to run")
                .default_value("all")
                .value_parser(["split", "reflow", "all"]),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory for output files (defaults to each input's directory)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("min-length")
                .long("min-length")
                .value_name("CHARS")
                .help("Length a line must exceed before it may end on a sentence terminator")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("fillers")
                .short('f')
                .long("fillers")
                .value_name("WORD,WORD,...")
                .help("Custom comma-separated disfluency vocabulary")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("placeholder")
                .long("placeholder")
                .value_name("TEXT")
                .help("Marker standing in for bleeped words"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (YAML/JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("profile")
                .short('p')
                .long("profile")
                .value_name("NAME")
                .help("Configuration profile to use (config file or built-in)"),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-profiles")
                .long("list-profiles")
                .help("List available configuration profiles")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-fillers")
                .long("list-fillers")
                .help("Print the disfluency vocabulary that would be used")
                .action(ArgAction::SetTrue),
        )
}

async fn load_config_file(matches: &clap::ArgMatches) -> Result<Option<ConfigFile>> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(Some(ConfigFile::load(path).await?)),
        None => Ok(ConfigFile::load_from_default_locations().await),
    }
}

/// Defaults < config file < profile < command line
fn apply_settings(
    matches: &clap::ArgMatches,
    config_file: Option<&ConfigFile>,
    mut builder: ConfigBuilder,
) -> Result<ConfigBuilder> {
    // Without a config file only the built-in settings apply
    let defaults = ConfigFile::default();
    let cf = config_file.unwrap_or(&defaults);
    builder = match matches.get_one::<String>("profile") {
        Some(profile_name) => cf.apply_profile_to_builder(profile_name, builder)?,
        None => cf.apply_to_builder(builder)?,
    };

    if let Some(stage) = matches.get_one::<String>("stage") {
        builder = builder.stage(stage.parse::<Stage>()?);
    }

    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        builder = builder.output_dir(dir.clone());
    }

    if let Some(&length) = matches.get_one::<usize>("min-length") {
        builder = builder.min_line_length(length)?;
    }

    if let Some(words) = matches.get_many::<String>("fillers") {
        builder = builder.filler_words(words.cloned().collect())?;
    }

    if let Some(placeholder) = matches.get_one::<String>("placeholder") {
        builder = builder.censor_placeholder(placeholder.clone())?;
    }

    Ok(builder)
}

fn list_profiles(config_file: Option<&ConfigFile>) {
    let defaults = ConfigFile::default();
    let config_file = config_file.unwrap_or(&defaults);

    println!("Available configuration profiles:");
    for (name, profile) in config_file.available_profiles() {
        let description = profile.description.unwrap_or_else(|| "No description".to_string());
        println!("  {}: {}", name, description);
    }
}

fn list_fillers(config: &Config) {
    let fillers = FillerSet::with_strip_suffixes(&config.filler_words, config.strip_suffixes.clone());
    println!("Disfluency vocabulary ({} words):", fillers.len());
    for word in fillers.words() {
        println!("  {}", word);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // Initialize logging
    let default_filter = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config_file = load_config_file(&matches).await?;

    if matches.get_flag("list-profiles") {
        list_profiles(config_file.as_ref());
        return Ok(());
    }

    if matches.get_flag("list-fillers") {
        // Listing needs no inputs, so the settings are not validated
        let preview = apply_settings(&matches, config_file.as_ref(), ConfigBuilder::new())?.preview();
        list_fillers(&preview);
        return Ok(());
    }

    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("input")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();
    let config = apply_settings(&matches, config_file.as_ref(), ConfigBuilder::new().input_files(inputs))?
        .build()?;
    let show_progress = !matches.get_flag("no-progress")
        && config_file.as_ref().and_then(|cf| cf.show_progress).unwrap_or(true);

    info!(
        "Processing {} file(s), stage '{}'",
        config.input_files.len(),
        config.stage.as_str()
    );

    let reports = pipeline::run(Arc::new(config), ProgressTracker::new(show_progress)).await?;

    for report in &reports {
        if let Some(split) = &report.split {
            info!(
                "{:?}: {} blocks, {} text lines, {} re-syncs, {} orphan indices",
                report.input, split.blocks, split.text_lines, split.resyncs, split.orphan_indices
            );
        }
        if let Some(reflow) = &report.reflow {
            info!(
                "{:?}: {} sentence lines, {} fillers removed, {} placeholders removed",
                report.input, reflow.lines, reflow.fillers_removed, reflow.placeholders_removed
            );
        }
        for output in &report.outputs {
            info!("✓ Wrote {:?}", output);
        }
    }

    Ok(())
}
