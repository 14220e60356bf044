use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "castforged")]
#[command(author, version, about = "Media format classification and H.264 renderer compatibility")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a format by extension or file name
    Format {
        /// Extension (`mkv`, `.MKV`) or file name
        #[arg(required = true)]
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a subtitle by extension or codec signature
    Subtitle {
        /// Extension (`srt`) or codec signature (`S_HDMV/PGS`)
        #[arg(required = true)]
        value: String,

        /// Treat the value as a codec signature
        #[arg(long)]
        codec: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all known formats
    Formats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all subtitle types with their stable indexes
    Subtitles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether an H.264 stream is within renderer limits
    H264 {
        /// Media file, or `-` to read the stream from stdin
        #[arg(required = true)]
        file: PathBuf,

        /// Frame width (probed with ffprobe when omitted)
        #[arg(long)]
        width: Option<u32>,

        /// Frame height (probed with ffprobe when omitted)
        #[arg(long)]
        height: Option<u32>,

        /// Known level, e.g. `4.1`
        #[arg(long)]
        level: Option<castforged_avc::Level>,

        /// Known reference frame count
        #[arg(long)]
        ref_frames: Option<i32>,

        /// Never demux the stream to fill in missing values
        #[arg(long)]
        no_probe: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect a media file: format, subtitle tracks and H.264 compatibility
    Inspect {
        /// File to inspect
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
