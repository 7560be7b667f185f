#[cfg(not(feature = "cli"))]
compile_error!("The `wdump` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use wiredump::cli;
use wiredump::cli::app::{Cli, ColorMode, Commands};
use wiredump::DumpError;

fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.log_level);

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, DumpError> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| DumpError::Io(format!("Cannot create {}: {}", path, e))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Annotate {
            file,
            layout,
            offset,
            length,
            no_offsets,
            no_padding,
        } => cli::annotate::execute(
            &cli::annotate::AnnotateOptions {
                file,
                layout,
                offset,
                length,
                no_offsets,
                no_padding,
                mmap: cli.mmap,
            },
            &mut writer,
        ),

        Commands::Record {
            file,
            doc,
            unframed,
            offset,
            length,
            no_offsets,
            no_padding,
        } => cli::record::execute(
            &cli::record::RecordOptions {
                file,
                doc,
                unframed,
                offset,
                length,
                no_offsets,
                no_padding,
                mmap: cli.mmap,
            },
            &mut writer,
        ),

        Commands::Layout {
            doc,
            unframed,
            json,
        } => cli::layout::execute(
            &cli::layout::LayoutOptions {
                doc,
                unframed,
                json,
            },
            &mut writer,
        ),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "wdump", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
