pub mod bspc;
pub mod command_builder;
pub mod error;
pub mod executor;
pub mod model;
pub mod xrandr;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use command_builder::{CommandBuilder, OutputLayout, ToolPaths};
pub use error::{ErrorReporting, MonsetupError, Result};
pub use executor::{CommandRecord, DryRunExecutor, Executor, ProcessExecutor};
pub use model::{
    DesktopToken, MonitorId, MonitorMode, MonitorProfile, Position, ProfileSource, Resolution,
    Role, Rotation,
};
pub use xrandr::{DisplayInventory, MonitorDetail, OutputStatus, XrandrInventory};
