use monsetup_common::bspc::parse_desktop_list;
use monsetup_common::model::MAIN_DESKTOP_COUNT;
use monsetup_common::{CommandBuilder, Executor, MonitorId, Result};
use serde::Serialize;

use crate::topology::TopologyPlan;

/// One live desktop and the monitor it is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopMove {
    pub desktop: String,
    pub monitor: MonitorId,
}

/// Split the live desktop list by position, not by name: in dual mode the
/// first five go to main and whatever follows goes to the secondary. Lists
/// that are not ten long split unevenly.
///
/// The names declared afterwards come from the plan, so a live list that does
/// not already hold 1-9,0 in canonical order ends up with the moved desktops
/// renamed in place.
pub fn assign_desktops(plan: &TopologyPlan, live: &[String]) -> Vec<DesktopMove> {
    let split = match plan.secondary {
        Some(_) => live.len().min(MAIN_DESKTOP_COUNT),
        None => live.len(),
    };

    live.iter()
        .enumerate()
        .map(|(index, desktop)| {
            let monitor = match &plan.secondary {
                Some(secondary) if index >= split => &secondary.id,
                _ => &plan.main.id,
            };
            DesktopMove {
                desktop: desktop.clone(),
                monitor: monitor.clone(),
            }
        })
        .collect()
}

/// Move the window manager's existing desktops onto the planned monitors and
/// declare each monitor's desktop names.
pub fn remap_desktops(plan: &TopologyPlan, builder: &CommandBuilder, executor: &dyn Executor) -> Result<()> {
    let output = executor.query(builder.bspc_query_desktops())?;
    let live = parse_desktop_list(&output);
    log::debug!("Live desktops: {:?}", live);

    for assignment in assign_desktops(plan, &live) {
        executor.dispatch(builder.bspc_move_desktop(&assignment.desktop, &assignment.monitor));
    }

    executor.dispatch(builder.bspc_declare_desktops(&plan.main.id, &plan.main.desktops));
    if let Some(secondary) = &plan.secondary {
        executor.dispatch(builder.bspc_declare_desktops(&secondary.id, &secondary.desktops));
    }

    log::info!("Remapped {} desktops for {} monitor mode", live.len(), plan.mode());
    Ok(())
}
