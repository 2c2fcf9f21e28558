//! One configuration pass: inventory, profiles, topology, then the side
//! effects in a fixed order (layout, desktops, rules, status bar).

use std::path::Path;

use monsetup_common::{
    CommandBuilder, DisplayInventory, ErrorReporting, Executor, Result, XrandrInventory,
};
use monsetup_config::Config;

use crate::desktops::remap_desktops;
use crate::layout::apply_layout;
use crate::profile::resolve_profiles;
use crate::rules::install_rules;
use crate::session::launch;
use crate::topology::{check_monitor_count, plan_topology, TopologyPlan};

pub struct Pipeline<'a> {
    config: &'a Config,
    builder: &'a CommandBuilder,
    executor: &'a dyn Executor,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, builder: &'a CommandBuilder, executor: &'a dyn Executor) -> Self {
        Self {
            config,
            builder,
            executor,
        }
    }

    /// Query the inventory and decide the topology. Runs queries only.
    pub fn plan(&self) -> Result<TopologyPlan> {
        let inventory = XrandrInventory::new(self.builder, self.executor);
        let connected = inventory.list_connected_monitors()?;
        check_monitor_count(&connected)?;

        let monitors = resolve_profiles(&connected, self.config, &inventory);
        plan_topology(&monitors, &self.config.detection)
    }

    /// Plan, then apply. Any error returned here happened before the first
    /// dispatch.
    pub fn run(&self) -> Result<TopologyPlan> {
        let launcher = self.config.session.launcher_path()?;
        let plan = self.plan()?;

        apply_layout(&plan, self.builder, self.executor);

        if let Err(e) = remap_desktops(&plan, self.builder, self.executor) {
            e.log_error("Skipping desktop remap");
        }

        install_rules(plan.mode(), self.config, self.builder, self.executor);
        launch(&plan, &launcher, self.builder, self.executor);

        log::info!("Monitor setup complete ({} monitor mode)", plan.mode());
        Ok(plan)
    }
}

/// Load the configuration at `path` and run a full pass with it.
pub fn run_with_config_file(
    path: &Path,
    builder: &CommandBuilder,
    executor: &dyn Executor,
) -> Result<TopologyPlan> {
    let config = Config::load_from_path(path)?;
    Pipeline::new(&config, builder, executor).run()
}
