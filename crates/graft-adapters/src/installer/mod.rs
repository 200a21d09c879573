//! Package installer adapters.

mod command;
mod recording;

pub use command::{CommandInstaller, InstallCommand, PackageManager};
pub use recording::RecordingInstaller;
