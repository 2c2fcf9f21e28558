use monsetup_common::error::{ConfigError, TopologyError};
use monsetup_common::model::{
    canonical_desktops, disjoint, main_desktops, partitions_canonical, secondary_desktops,
};
use monsetup_common::{
    DesktopToken, MonitorId, MonitorMode, MonitorProfile, MonsetupError, Position,
    ProfileSource, Result,
};
use monsetup_config::DetectionConfig;
use serde::Serialize;

use crate::profile::ResolvedMonitor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMonitor {
    pub id: MonitorId,
    pub profile: MonitorProfile,
    /// Desktop names declared on this monitor.
    pub desktops: Vec<DesktopToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyPlan {
    pub main: PlannedMonitor,
    pub secondary: Option<PlannedMonitor>,
    /// Placement of the secondary relative to main; set iff `secondary` is.
    pub position: Option<Position>,
}

impl TopologyPlan {
    pub fn mode(&self) -> MonitorMode {
        if self.secondary.is_some() {
            MonitorMode::Dual
        } else {
            MonitorMode::Single
        }
    }
}

/// Rejects monitor counts other than one or two.
pub fn check_monitor_count(connected: &[MonitorId]) -> Result<()> {
    match connected.len() {
        0 => Err(MonsetupError::Topology(TopologyError::NoMonitors)),
        1 | 2 => Ok(()),
        count => Err(MonsetupError::Topology(TopologyError::TooManyMonitors {
            count,
            monitors: connected.to_vec(),
        })),
    }
}

/// Decide main/secondary for the connected monitors, given in enumeration order.
pub fn plan_topology(monitors: &[ResolvedMonitor], detection: &DetectionConfig) -> Result<TopologyPlan> {
    let ids: Vec<MonitorId> = monitors.iter().map(|m| m.id.clone()).collect();
    check_monitor_count(&ids)?;

    if let [only] = monitors {
        let plan = TopologyPlan {
            main: PlannedMonitor {
                id: only.id.clone(),
                profile: only.profile.clone(),
                desktops: canonical_desktops(),
            },
            secondary: None,
            position: None,
        };
        log::info!("Single monitor: {} ({})", only.id, only.profile.resolution);
        return Ok(plan);
    }

    let main_index = select_main(monitors, detection);
    let main = &monitors[main_index];
    let secondary = &monitors[1 - main_index];
    let position = secondary.profile.position.unwrap_or_default();

    let (main_set, secondary_set) = dual_desktop_sets(main, secondary)?;

    log::info!("Main: {} ({})", main.id, main.profile.resolution);
    log::info!(
        "Secondary: {} ({}) - {} of main",
        secondary.id,
        secondary.profile.resolution,
        position
    );

    Ok(TopologyPlan {
        main: PlannedMonitor {
            id: main.id.clone(),
            profile: main.profile.clone(),
            desktops: main_set,
        },
        secondary: Some(PlannedMonitor {
            id: secondary.id.clone(),
            profile: secondary.profile.clone(),
            desktops: secondary_set,
        }),
        position: Some(position),
    })
}

/// Desktop names for each side of a dual setup. Sets that both come from
/// configuration are declared as written, as long as no name is on both
/// monitors. Otherwise a pair that does not split 1-9,0 is replaced with
/// 1-5 / 6-9,0.
fn dual_desktop_sets(
    main: &ResolvedMonitor,
    secondary: &ResolvedMonitor,
) -> Result<(Vec<DesktopToken>, Vec<DesktopToken>)> {
    let (a, b) = (&main.profile.desktops, &secondary.profile.desktops);
    if partitions_canonical(a, b) {
        return Ok((a.clone(), b.clone()));
    }

    let explicit = main.profile.source == ProfileSource::Configured
        && secondary.profile.source == ProfileSource::Configured;
    if explicit {
        if !disjoint(a, b) {
            return Err(MonsetupError::Config(ConfigError::Validation {
                message: format!(
                    "Monitors '{}' and '{}' both list the same desktop in workspaces",
                    main.id, secondary.id
                ),
            }));
        }
        log::info!(
            "Desktop sets of {} and {} do not cover 1-9,0, declaring them as configured",
            main.id,
            secondary.id
        );
        return Ok((a.clone(), b.clone()));
    }

    log::warn!(
        "Desktop sets of {} and {} do not split 1-9,0 between them, using 1-5 / 6-9,0",
        main.id,
        secondary.id
    );
    Ok((main_desktops(), secondary_desktops()))
}

/// Configured main claim, then the first external display, then the first monitor.
fn select_main(monitors: &[ResolvedMonitor], detection: &DetectionConfig) -> usize {
    if let Some(index) = monitors.iter().position(|m| m.profile.claims_main()) {
        log::debug!("{} is main by configuration", monitors[index].id);
        return index;
    }

    if let Some(index) = monitors
        .iter()
        .position(|m| !detection.is_internal_panel(&m.id))
    {
        log::debug!("{} is main as the first external display", monitors[index].id);
        return index;
    }

    0
}
