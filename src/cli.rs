use clap::{Parser, Subcommand, ValueEnum};

use crate::graph::MediaType;

#[derive(Parser)]
#[command(
    name = "patchwire",
    about = "Terminal patchbay for ALSA sequencer and PipeWire graphs"
)]
pub struct Cli {
    /// Optional config file (.toml)
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the device/port tree for one media type and exit
    List {
        #[arg(value_enum, default_value = "audio")]
        media: MediaArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MediaArg {
    Audio,
    AlsaMidi,
    PwMidi,
    Video,
}

impl MediaArg {
    pub fn media_type(self) -> MediaType {
        match self {
            MediaArg::Audio => MediaType::Audio,
            MediaArg::AlsaMidi => MediaType::AlsaMidi,
            MediaArg::PwMidi => MediaType::PipewireMidi,
            MediaArg::Video => MediaType::Video,
        }
    }
}
