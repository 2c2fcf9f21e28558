use std::cell::RefCell;
use std::collections::HashMap;

use monsetup_common::error::InventoryError;
use monsetup_common::testing::ScriptedExecutor;
use monsetup_common::{
    CommandBuilder, DisplayInventory, MonitorDetail, MonitorId, MonsetupError, Resolution, Result,
    ToolPaths,
};

/// In-memory inventory: connected ids in order, each with an optional native mode.
#[derive(Default)]
pub struct FakeInventory {
    monitors: Vec<(MonitorId, Option<String>)>,
    failing: bool,
    queried: RefCell<Vec<String>>,
}

impl FakeInventory {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.borrow().clone()
    }
}

pub fn inventory_with(monitors: &[(&str, Option<&str>)]) -> FakeInventory {
    FakeInventory {
        monitors: monitors
            .iter()
            .map(|(id, native)| (id.to_string(), native.map(str::to_string)))
            .collect(),
        ..FakeInventory::default()
    }
}

impl DisplayInventory for FakeInventory {
    fn list_connected_monitors(&self) -> Result<Vec<MonitorId>> {
        Ok(self.monitors.iter().map(|(id, _)| id.clone()).collect())
    }

    fn query_monitor_detail(&self, id: &str) -> Result<MonitorDetail> {
        self.queried.borrow_mut().push(id.to_string());
        if self.failing {
            return Err(MonsetupError::Inventory(InventoryError::Query {
                tool: "xrandr".to_string(),
                message: "Can't open display".to_string(),
            }));
        }

        let native = self
            .monitors
            .iter()
            .find(|(name, _)| name == id)
            .and_then(|(_, native)| native.as_deref())
            .map(|native| native.parse::<Resolution>())
            .transpose()?;

        Ok(MonitorDetail {
            native_resolution: native,
            current_resolution: None,
        })
    }
}

pub fn builder() -> CommandBuilder {
    CommandBuilder::new(ToolPaths::bare())
}

/// `xrandr --query` output with each `(name, preferred mode)` connected.
pub fn xrandr_dump(monitors: &[(&str, &str)]) -> String {
    let mut dump = String::from("Screen 0: minimum 8 x 8, current 1920 x 1080, maximum 32767 x 32767\n");
    for (name, mode) in monitors {
        dump.push_str(&format!(
            "{} connected {}+0+0 (normal left inverted right x axis y axis) 300mm x 200mm\n",
            name, mode
        ));
        dump.push_str(&format!("   {}     60.00*+  59.94\n", mode));
        dump.push_str("   1280x720      60.00\n");
    }
    dump.push_str("VGA-1 disconnected (normal left inverted right x axis y axis)\n");
    dump
}

/// Ten desktop ids, as `bspc query -D` prints them.
pub fn ten_desktops() -> String {
    (0..10)
        .map(|i| format!("0x0020000{}\n", i))
        .collect()
}

pub fn scripted(monitors: &[(&str, &str)], desktops: &str) -> ScriptedExecutor {
    ScriptedExecutor::new()
        .respond("xrandr --query", &xrandr_dump(monitors))
        .respond("bspc query -D", desktops)
}

pub fn env_of(records: &[monsetup_common::CommandRecord], program: &str) -> HashMap<String, Option<String>> {
    records
        .iter()
        .find(|r| r.program == program)
        .map(|r| r.envs.iter().cloned().collect())
        .unwrap_or_default()
}
