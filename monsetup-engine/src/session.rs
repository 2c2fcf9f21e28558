use std::path::Path;

use monsetup_common::{CommandBuilder, Executor};

use crate::topology::TopologyPlan;

pub const MAIN_MONITOR: &str = "MAIN_MONITOR";
pub const SECONDARY_MONITOR: &str = "SECONDARY_MONITOR";

/// Variables handed to the status bar launcher. `None` unsets an inherited
/// value.
pub fn environment(plan: &TopologyPlan) -> Vec<(&'static str, Option<&str>)> {
    vec![
        (MAIN_MONITOR, Some(plan.main.id.as_str())),
        (SECONDARY_MONITOR, plan.secondary.as_ref().map(|s| s.id.as_str())),
    ]
}

/// Start the status bar launcher for `plan`. This is the last step of a run
/// and is not retried.
pub fn launch(plan: &TopologyPlan, launcher: &Path, builder: &CommandBuilder, executor: &dyn Executor) {
    if !launcher.exists() {
        log::warn!("Status bar launcher {} does not exist", launcher.display());
    }

    match &plan.secondary {
        Some(secondary) => log::info!(
            "Launching status bars on {} and {}",
            plan.main.id,
            secondary.id
        ),
        None => log::info!("Launching status bar on {}", plan.main.id),
    }

    executor.dispatch(builder.status_bar(launcher, &environment(plan)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::resolve_profiles;
    use crate::test_support::{builder, inventory_with};
    use crate::topology::plan_topology;
    use monsetup_common::testing::ScriptedExecutor;
    use monsetup_config::Config;

    fn plan(monitors: &[(&str, Option<&str>)]) -> TopologyPlan {
        let config = Config::default();
        let inventory = inventory_with(monitors);
        let connected: Vec<String> = monitors.iter().map(|(id, _)| id.to_string()).collect();
        plan_topology(&resolve_profiles(&connected, &config, &inventory), &config.detection).unwrap()
    }

    #[test]
    fn test_dual_environment() {
        let plan = plan(&[("eDP-1", Some("1920x1080")), ("HDMI-1", Some("1920x1080"))]);
        let executor = ScriptedExecutor::new();

        launch(&plan, Path::new("/tmp/launch.sh"), &builder(), &executor);
        let dispatched = executor.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].command_line(), "bash /tmp/launch.sh");
        assert_eq!(dispatched[0].env(MAIN_MONITOR), Some(Some("HDMI-1")));
        assert_eq!(dispatched[0].env(SECONDARY_MONITOR), Some(Some("eDP-1")));
    }

    #[test]
    fn test_single_unsets_secondary() {
        let plan = plan(&[("eDP-1", Some("1920x1080"))]);
        let executor = ScriptedExecutor::new();

        launch(&plan, Path::new("/tmp/launch.sh"), &builder(), &executor);
        let dispatched = executor.dispatched();
        assert_eq!(dispatched[0].env(MAIN_MONITOR), Some(Some("eDP-1")));
        assert_eq!(dispatched[0].env(SECONDARY_MONITOR), Some(None));
    }
}
