use std::path::{Path, PathBuf};
use std::process::Command;

use crate::model::{DesktopToken, Position, Resolution, Rotation};

/// Locations of the external tools monsetup drives.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub xrandr: PathBuf,
    pub bspc: PathBuf,
    pub shell: PathBuf,
}

impl ToolPaths {
    /// Resolve each tool through `PATH`. A tool that cannot be found keeps its
    /// bare name so the failure surfaces when it is actually run.
    pub fn discover(shell: &str) -> Self {
        Self {
            xrandr: locate("xrandr"),
            bspc: locate("bspc"),
            shell: locate(shell),
        }
    }

    /// Bare program names, resolved by the OS at spawn time.
    pub fn bare() -> Self {
        Self {
            xrandr: PathBuf::from("xrandr"),
            bspc: PathBuf::from("bspc"),
            shell: PathBuf::from("bash"),
        }
    }
}

fn locate(tool: &str) -> PathBuf {
    match which::which(tool) {
        Ok(path) => path,
        Err(_) => {
            log::warn!("{} not found in PATH", tool);
            PathBuf::from(tool)
        }
    }
}

/// One `--output` section of an xrandr layout call.
#[derive(Debug, Clone)]
pub struct OutputLayout<'a> {
    pub name: &'a str,
    pub resolution: Resolution,
    pub rotation: Rotation,
    pub primary: bool,
    /// Placement relative to another output.
    pub relative_to: Option<(Position, &'a str)>,
}

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    tools: ToolPaths,
}

impl CommandBuilder {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    pub fn xrandr_query(&self) -> Command {
        let mut cmd = Command::new(&self.tools.xrandr);
        cmd.arg("--query");
        cmd
    }

    /// A single xrandr call configuring every output at once.
    pub fn xrandr_layout(&self, outputs: &[OutputLayout<'_>]) -> Command {
        let mut cmd = Command::new(&self.tools.xrandr);
        for output in outputs {
            cmd.args(["--output", output.name]);
            if output.primary {
                cmd.arg("--primary");
            }
            cmd.args(["--mode", &output.resolution.to_string()]);
            cmd.args(["--rotate", output.rotation.as_str()]);
            if let Some((position, other)) = output.relative_to {
                cmd.args([position.xrandr_flag(), other]);
            }
        }
        cmd
    }

    pub fn bspc_query_desktops(&self) -> Command {
        let mut cmd = Command::new(&self.tools.bspc);
        cmd.args(["query", "-D"]);
        cmd
    }

    pub fn bspc_move_desktop(&self, desktop: &str, monitor: &str) -> Command {
        let mut cmd = Command::new(&self.tools.bspc);
        cmd.args(["desktop", desktop, "--to-monitor", monitor]);
        cmd
    }

    /// Replaces the monitor's desktop names with `desktops`.
    pub fn bspc_declare_desktops(&self, monitor: &str, desktops: &[DesktopToken]) -> Command {
        let mut cmd = Command::new(&self.tools.bspc);
        cmd.args(["monitor", monitor, "-d"]);
        cmd.args(desktops.iter().map(DesktopToken::to_string));
        cmd
    }

    /// Removes every rule matching `app`.
    pub fn bspc_remove_rule(&self, app: &str) -> Command {
        let mut cmd = Command::new(&self.tools.bspc);
        cmd.args(["rule", "-r", app]);
        cmd
    }

    /// `bspc rule -a <app>` with a clause per value that is present.
    pub fn bspc_add_rule(&self, app: &str, desktop: Option<&str>, follow: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.tools.bspc);
        cmd.args(["rule", "-a", app]);
        if let Some(desktop) = desktop {
            cmd.arg(format!("desktop={}", desktop));
        }
        if let Some(follow) = follow {
            cmd.arg(format!("follow={}", follow));
        }
        cmd
    }

    /// Runs the status bar launcher script through the configured shell.
    /// `None` values remove the variable from the inherited environment.
    pub fn status_bar(&self, launcher: &Path, env: &[(&str, Option<&str>)]) -> Command {
        let mut cmd = Command::new(&self.tools.shell);
        cmd.arg(launcher);
        for (key, value) in env {
            match value {
                Some(value) => {
                    cmd.env(key, value);
                }
                None => {
                    cmd.env_remove(key);
                }
            }
        }
        cmd
    }
}
