use serde::Serialize;

use crate::command_builder::CommandBuilder;
use crate::error::{InventoryError, MonsetupError};
use crate::executor::Executor;
use crate::model::{MonitorId, Resolution};
use crate::Result;

/// Modes known for one output. Either field may be missing: a disabled output
/// has no current mode, and some panels flag no preferred mode at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorDetail {
    pub native_resolution: Option<Resolution>,
    pub current_resolution: Option<Resolution>,
}

/// One output block of `xrandr --query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputStatus {
    pub name: MonitorId,
    pub connected: bool,
    pub primary: bool,
    pub detail: MonitorDetail,
}

/// Source of connected monitors and their modes.
pub trait DisplayInventory {
    /// Connected outputs in display-server enumeration order.
    fn list_connected_monitors(&self) -> Result<Vec<MonitorId>>;

    /// Native and current mode of one output. An output that is missing from
    /// the dump, or has no preferred mode, yields an empty detail.
    fn query_monitor_detail(&self, id: &str) -> Result<MonitorDetail>;
}

/// Parses a full `xrandr --query` dump.
///
/// ```text
/// Screen 0: minimum 8 x 8, current 3840 x 1080, maximum 32767 x 32767
/// eDP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 344mm x 194mm
///    1920x1080     60.02*+  59.93
///    1680x1050     59.88
/// HDMI-1 disconnected (normal left inverted right x axis y axis)
/// ```
pub fn parse_query(dump: &str) -> Vec<OutputStatus> {
    let mut outputs: Vec<OutputStatus> = Vec::new();

    for line in dump.lines() {
        if line.trim().is_empty() || line.starts_with("Screen ") {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            // Mode line of the most recent output
            let Some(current) = outputs.last_mut() else {
                continue;
            };
            if current.detail.native_resolution.is_some() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let Some(mode) = tokens.next() else {
                continue;
            };
            if tokens.any(|rate| rate.contains('+')) {
                current.detail.native_resolution = parse_mode_name(mode);
            }
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            continue;
        };
        let rest: Vec<&str> = tokens.collect();
        let connected = rest.first() == Some(&"connected");
        let primary = rest.contains(&"primary");
        let current_resolution = rest.iter().find_map(|token| parse_geometry(token));

        outputs.push(OutputStatus {
            name: name.to_string(),
            connected,
            primary,
            detail: MonitorDetail {
                native_resolution: None,
                current_resolution,
            },
        });
    }

    outputs
}

/// Names of connected outputs, in dump order.
pub fn parse_connected(dump: &str) -> Vec<MonitorId> {
    parse_query(dump)
        .into_iter()
        .filter(|output| output.connected)
        .map(|output| output.name)
        .collect()
}

/// Detail for a single output, matched by exact name.
pub fn parse_monitor_detail(dump: &str, id: &str) -> MonitorDetail {
    parse_query(dump)
        .into_iter()
        .find(|output| output.name == id)
        .map(|output| output.detail)
        .unwrap_or_default()
}

/// `1920x1080+0+0` -> 1920x1080
fn parse_geometry(token: &str) -> Option<Resolution> {
    let (size, offsets) = token.split_once('+')?;
    if offsets.is_empty() {
        return None;
    }
    size.parse().ok()
}

/// Mode names may carry suffixes: `1920x1080i`, `2560x1440_60.00`.
fn parse_mode_name(mode: &str) -> Option<Resolution> {
    let base = mode.split('_').next().unwrap_or(mode);
    base.trim_end_matches(|c: char| !c.is_ascii_digit()).parse().ok()
}

/// Inventory backed by the `xrandr` binary.
pub struct XrandrInventory<'a> {
    builder: &'a CommandBuilder,
    executor: &'a dyn Executor,
}

impl<'a> XrandrInventory<'a> {
    pub fn new(builder: &'a CommandBuilder, executor: &'a dyn Executor) -> Self {
        Self { builder, executor }
    }

    fn dump(&self) -> Result<String> {
        self.executor
            .query(self.builder.xrandr_query())
            .map_err(|e| {
                MonsetupError::Inventory(InventoryError::Query {
                    tool: "xrandr".to_string(),
                    message: e.to_string(),
                })
            })
    }

    /// Every output in the dump, connected or not.
    pub fn outputs(&self) -> Result<Vec<OutputStatus>> {
        Ok(parse_query(&self.listing()?))
    }

    /// A dump that names at least one output.
    fn listing(&self) -> Result<String> {
        let dump = self.dump()?;
        if parse_query(&dump).is_empty() {
            return Err(MonsetupError::Inventory(InventoryError::Unparsable {
                tool: "xrandr".to_string(),
                output: dump,
            }));
        }
        Ok(dump)
    }
}

impl DisplayInventory for XrandrInventory<'_> {
    fn list_connected_monitors(&self) -> Result<Vec<MonitorId>> {
        let connected = parse_connected(&self.listing()?);
        log::info!("Connected monitors: {:?}", connected);
        Ok(connected)
    }

    fn query_monitor_detail(&self, id: &str) -> Result<MonitorDetail> {
        let dump = self.dump()?;
        let detail = parse_monitor_detail(&dump, id);
        log::debug!("xrandr detail for {}: {:?}", id, detail);
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_builder::ToolPaths;
    use crate::testing::ScriptedExecutor;

    const LAPTOP_AND_4K: &str = "\
Screen 0: minimum 8 x 8, current 3840 x 1080, maximum 32767 x 32767
eDP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 344mm x 194mm
   1920x1080     60.02*+  59.93
   1680x1050     59.88
HDMI-1 disconnected (normal left inverted right x axis y axis)
DP-1 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 600mm x 340mm
   3840x2160     60.00 +  30.00
   1920x1080     60.00*   59.94
DP-2 connected (normal left inverted right x axis y axis)
   2560x1440i    59.95
";

    #[test]
    fn test_parse_connected_in_order() {
        assert_eq!(parse_connected(LAPTOP_AND_4K), vec!["eDP-1", "DP-1", "DP-2"]);
    }

    #[test]
    fn test_parse_query_flags() {
        let outputs = parse_query(LAPTOP_AND_4K);
        assert_eq!(outputs.len(), 4);
        assert!(outputs[0].primary);
        assert!(!outputs[1].connected);
        assert!(!outputs[2].primary);
    }

    #[test]
    fn test_native_is_preferred_mode() {
        let detail = parse_monitor_detail(LAPTOP_AND_4K, "DP-1");
        assert_eq!(detail.native_resolution, Some(Resolution::new(3840, 2160)));
        assert_eq!(detail.current_resolution, Some(Resolution::new(1920, 1080)));
    }

    #[test]
    fn test_exact_name_match() {
        // "DP-1" must not pick up the eDP-1 block.
        let dump = "\
eDP-1 connected primary 2880x1800+0+0 (normal) 300mm x 190mm
   2880x1800     60.00*+
DP-1 connected (normal)
   1920x1080     60.00
";
        let detail = parse_monitor_detail(dump, "DP-1");
        assert_eq!(detail, MonitorDetail::default());
    }

    #[test]
    fn test_missing_preferred_mode_is_empty_detail() {
        let detail = parse_monitor_detail(LAPTOP_AND_4K, "DP-2");
        assert_eq!(detail.native_resolution, None);
        assert_eq!(detail.current_resolution, None);

        assert_eq!(parse_monitor_detail(LAPTOP_AND_4K, "VGA-1"), MonitorDetail::default());
    }

    #[test]
    fn test_mode_name_suffixes() {
        assert_eq!(parse_mode_name("1920x1080i"), Some(Resolution::new(1920, 1080)));
        assert_eq!(parse_mode_name("2560x1440_60.00"), Some(Resolution::new(2560, 1440)));
        assert_eq!(parse_mode_name("garbage"), None);
    }

    #[test]
    fn test_inventory_reports_query_failure() {
        let builder = CommandBuilder::new(ToolPaths::bare());
        let executor = ScriptedExecutor::new().fail("xrandr --query", "Can't open display");
        let inventory = XrandrInventory::new(&builder, &executor);

        match inventory.query_monitor_detail("eDP-1") {
            Err(MonsetupError::Inventory(InventoryError::Query { tool, .. })) => assert_eq!(tool, "xrandr"),
            other => panic!("Expected InventoryError::Query, got {:?}", other),
        }
    }

    #[test]
    fn test_inventory_rejects_empty_dump() {
        let builder = CommandBuilder::new(ToolPaths::bare());
        let executor = ScriptedExecutor::new().respond("xrandr --query", "");
        let inventory = XrandrInventory::new(&builder, &executor);

        assert!(matches!(
            inventory.list_connected_monitors(),
            Err(MonsetupError::Inventory(InventoryError::Unparsable { .. }))
        ));
    }

    #[test]
    fn test_inventory_lists_connected_in_order() {
        let builder = CommandBuilder::new(ToolPaths::bare());
        let executor = ScriptedExecutor::new().respond("xrandr --query", LAPTOP_AND_4K);
        let inventory = XrandrInventory::new(&builder, &executor);

        assert_eq!(inventory.list_connected_monitors().unwrap(), vec!["eDP-1", "DP-1", "DP-2"]);
        assert_eq!(inventory.outputs().unwrap().len(), 4);
    }
}
