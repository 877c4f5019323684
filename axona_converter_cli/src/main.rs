use clap::{Arg, ArgMatches, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;

use libaxona_converter::config::ConversionConfig;
use libaxona_converter::conversion_status::ConversionPhase;
use libaxona_converter::process::process_conversion;

fn make_template_config(path: &Path) {
    let config = ConversionConfig::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

/// The original converter only treats a literal `T` as true.
fn flag(matches: &ArgMatches, name: &str) -> Result<bool, String> {
    match matches.get_one::<String>(name) {
        Some(value) => Ok(value == "T"),
        None => Err(format!("No {name} flag given (T/F)")),
    }
}

fn config_from_args(matches: &ArgMatches) -> Result<ConversionConfig, String> {
    let set_file = matches
        .get_one::<String>("set_file")
        .ok_or("No .set file path given")?;
    let chans_str = matches
        .get_one::<String>("chans_per_tetrode")
        .ok_or("No chans_per_tetrode given")?;
    let chans_per_tetrode: usize = chans_str
        .parse()
        .map_err(|_| format!("chans_per_tetrode must be an integer, got {chans_str}"))?;
    let transpose = flag(matches, "transpose")?;
    let split = flag(matches, "split")?;
    let (split_transpose, split_data_dir) = if split {
        let subdir = matches
            .get_one::<String>("split_dir")
            .ok_or("No split output subdirectory given")?;
        (flag(matches, "split_transpose")?, Some(subdir.clone()))
    } else {
        (false, None)
    };

    Ok(ConversionConfig {
        set_file_path: PathBuf::from(set_file),
        chans_per_tetrode,
        transpose,
        split,
        split_transpose,
        split_data_dir,
    })
}

fn main() {
    // Create a cli
    let matches = Command::new("axona_converter_cli")
        .arg_required_else_help(true)
        .args_conflicts_with_subcommands(true)
        .subcommand(
            Command::new("new")
                .about("Make a template configuration yaml file")
                .arg(Arg::new("path").required(true).help("Path for the template")),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Run from a YAML configuration file instead of positional arguments"),
        )
        .arg(Arg::new("set_file").help("Path to the recording .set metadata file"))
        .arg(Arg::new("chans_per_tetrode").help("Channels retained per tetrode (1-4)"))
        .arg(Arg::new("transpose").help("T to write the main outfile time-major"))
        .arg(Arg::new("split").help("T to also write per-tetrode outfiles"))
        .arg(Arg::new("split_transpose").help("T to interleave the split outfiles"))
        .arg(Arg::new("split_dir").help("Subdirectory to receive split outfiles"))
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    if let Some(("new", submatches)) = matches.subcommand() {
        let path = PathBuf::from(submatches.get_one::<String>("path").expect("We require args"));
        log::info!("Making a template config at {}...", path.to_string_lossy());
        make_template_config(&path);
        log::info!("Done.");
        return;
    }

    // Assemble the run configuration
    let config = if let Some(config_path) = matches.get_one::<String>("config") {
        match ConversionConfig::read_config_file(Path::new(config_path)) {
            Ok(c) => c,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        }
    } else {
        match config_from_args(&matches) {
            Ok(c) => c,
            Err(e) => {
                log::error!("{e}");
                log::error!(
                    "Usage: axona_converter_cli <set_file> <chans_per_tetrode> \
                     <transpose T/F> <split T/F> [<split_transpose T/F> <split_dir>]"
                );
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = config.validate() {
        log::error!("{e}");
        std::process::exit(1);
    }

    log::info!("Converting {}", config.set_file_path.to_string_lossy());
    log::info!("Channels per tetrode: {}", config.chans_per_tetrode);
    if config.transpose {
        log::info!("Will transpose the main outfile");
    }
    if config.split {
        log::info!("Will split the output files");
        if config.split_transpose {
            log::info!("Will transpose the split outfiles");
        }
    }

    // Setup the progress bar and spawn the conversion
    let pb = pb_manager.add(ProgressBar::new(100));
    let (tx, rx) = channel();
    let thread_config = config.clone();
    let handle = std::thread::spawn(move || process_conversion(&thread_config, &tx));

    let mut last_phase = ConversionPhase::Decode;
    for status in rx {
        pb.set_position((status.progress * 100.0) as u64);
        if status.phase != last_phase {
            match status.phase {
                ConversionPhase::Decode => (),
                ConversionPhase::WriteChannels => log::info!("Writing channel data..."),
                ConversionPhase::WriteEvents => log::info!("Writing event data..."),
                ConversionPhase::Done => pb.set_position(100),
            }
            last_phase = status.phase;
        }
    }

    match handle.join() {
        Ok(result) => match result {
            Ok(_) => log::info!("Successfully converted data!"),
            Err(e) => {
                log::error!("Conversion failed with error: {e}");
                std::process::exit(1);
            }
        },
        Err(_) => {
            log::error!("Failed to join conversion task!");
            std::process::exit(1);
        }
    }

    pb.finish();

    log::info!("Done.");
}
