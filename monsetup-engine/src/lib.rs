pub mod desktops;
pub mod layout;
pub mod pipeline;
pub mod profile;
pub mod rules;
pub mod session;
pub mod topology;

#[cfg(test)]
mod test_support;

pub use desktops::{assign_desktops, remap_desktops, DesktopMove};
pub use layout::{apply_layout, output_layouts};
pub use pipeline::{run_with_config_file, Pipeline};
pub use profile::{resolve_profile, resolve_profiles, ResolvedMonitor};
pub use rules::install_rules;
pub use session::launch;
pub use topology::{check_monitor_count, plan_topology, PlannedMonitor, TopologyPlan};
