use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "wdump")]
#[command(about = "Annotated hex dumps of binary-encoded messages")]
#[command(version)]
pub struct Cli {
    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Memory-map input files instead of reading them
    #[arg(long, global = true)]
    pub mmap: bool,

    /// Log level for diagnostics on stderr (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn", global = true)]
    pub log_level: log::LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hex dump a buffer against a fixed list of annotations
    Annotate {
        /// Path to the encoded message
        #[arg(short, long)]
        file: String,

        /// JSON file holding an array of {"name", "size"} annotations
        #[arg(short, long)]
        layout: String,

        /// Byte offset of the message within the file
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Number of bytes to read (default: through end of file)
        #[arg(long)]
        length: Option<usize>,

        /// Omit the offset column on field lines
        #[arg(long = "no-offsets")]
        no_offsets: bool,

        /// Do not pad short lines with placeholders
        #[arg(long = "no-padding")]
        no_padding: bool,
    },

    /// Hex dump a buffer against the layout of a value document
    Record {
        /// Path to the encoded message
        #[arg(short, long)]
        file: String,

        /// JSON value document describing the encoded record
        #[arg(short, long)]
        doc: String,

        /// The buffer has no Length/Prefix framing
        #[arg(long)]
        unframed: bool,

        /// Byte offset of the message within the file
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Number of bytes to read (default: through end of file)
        #[arg(long)]
        length: Option<usize>,

        /// Omit the offset column on field lines
        #[arg(long = "no-offsets")]
        no_offsets: bool,

        /// Do not pad short lines with placeholders
        #[arg(long = "no-padding")]
        no_padding: bool,
    },

    /// Print the annotation stream of a value document
    Layout {
        /// JSON value document describing the encoded record
        #[arg(short, long)]
        doc: String,

        /// Leave out the Length/Prefix framing fields
        #[arg(long)]
        unframed: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
