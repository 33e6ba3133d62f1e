use std::path::PathBuf;

use clap::Parser;

/// Drive a page hands-free with spoken phrases and camera gestures.
///
/// Every line on stdin is a transcript emission. Lines starting with `:` are
/// host controls (`:listen`, `:mute`, `:gesture on|off`, `:tab`, `:shift-tab`,
/// `:remove <n>`, `:resize [w h]`, `:status`, `:quit`).
#[derive(Parser, Debug)]
#[command(name = "beckon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Page description: JSON array of elements
    #[arg(short, long)]
    pub page: PathBuf,

    /// Config file, merged over defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory of still images replayed as camera frames
    #[arg(short, long)]
    pub frames: Option<PathBuf>,

    /// Brightness of the synthetic camera when no frame directory is given
    #[arg(short, long, default_value_t = 120)]
    pub brightness: u8,

    /// Start gesture sampling at launch
    #[arg(short, long)]
    pub gesture: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}
