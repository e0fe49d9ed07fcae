use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::mode::OutputMode;
use crate::region::Percentages;

#[derive(Parser)]
#[command(name = "trackscreen")]
#[command(about = "Turn an area of your touchscreen into a virtual trackpad")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Touchscreen device path (e.g. /dev/input/event5), or its name with --by-name
    #[arg(env = "TRACKSCREEN_DEVICE")]
    pub device: Option<String>,

    /// Look the touchscreen up by device name instead of path
    #[arg(short = 'n', long)]
    pub by_name: bool,

    /// Trackpad area as left,top,width,height percentages of the touchscreen
    #[arg(short = 'd', long, value_name = "LEFT,TOP,WIDTH,HEIGHT", value_parser = clap::value_parser!(Percentages))]
    pub area: Option<Percentages>,

    /// Multiplier applied to finger movement in relative mode
    #[arg(short, long)]
    pub scale: Option<f64>,

    /// Output mode (passthrough, relative)
    #[arg(short, long, value_parser = clap::value_parser!(OutputMode))]
    pub mode: Option<OutputMode>,

    /// Key code to hold while a finger rests beside the trackpad
    #[arg(short = 'k', long)]
    pub side_key: Option<u16>,

    /// Do not grab the touchscreen exclusively
    #[arg(long)]
    pub no_grab: bool,

    /// Maximum number of events buffered per report
    #[arg(long)]
    pub batch_capacity: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file
    #[arg(long, env = "TRACKSCREEN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Dump decoded touchscreen events for debugging
    Dump {
        /// Touchscreen device path, or its name with --by-name
        device: String,

        /// Look the touchscreen up by device name instead of path
        #[arg(short = 'n', long)]
        by_name: bool,
    },
}
