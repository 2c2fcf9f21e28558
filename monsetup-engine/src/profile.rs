//! Per-monitor profile resolution: explicit configuration first, then
//! detection from the preferred xrandr mode, then hard-coded defaults.

use monsetup_common::model::{main_desktops, secondary_desktops, FALLBACK_RESOLUTION};
use monsetup_common::{
    DisplayInventory, ErrorReporting, MonitorDetail, MonitorId, MonitorProfile, ProfileSource,
    Resolution, Role, Rotation,
};
use monsetup_config::{Config, DetectionConfig, MonitorConfig};
use serde::Serialize;

/// A connected monitor together with its resolved profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMonitor {
    pub id: MonitorId,
    pub profile: MonitorProfile,
}

/// Resolve every connected monitor, keeping enumeration order.
pub fn resolve_profiles(
    connected: &[MonitorId],
    config: &Config,
    inventory: &dyn DisplayInventory,
) -> Vec<ResolvedMonitor> {
    connected
        .iter()
        .map(|id| ResolvedMonitor {
            id: id.clone(),
            profile: resolve_profile(id, config, inventory),
        })
        .collect()
}

pub fn resolve_profile(id: &str, config: &Config, inventory: &dyn DisplayInventory) -> MonitorProfile {
    if let Some(monitor) = config.monitor(id) {
        let profile = configured_profile(id, monitor, &config.detection);
        log::info!("{}: using configured profile ({} {})", id, profile.resolution, profile.rotation);
        return profile;
    }

    match inventory.query_monitor_detail(id) {
        Ok(MonitorDetail {
            native_resolution: Some(native),
            ..
        }) => detected_profile(id, native, &config.detection),
        Ok(_) => {
            log::warn!("{}: native resolution unknown, using fallback profile", id);
            fallback_profile()
        }
        Err(e) => {
            log::warn!("{}: {}, using fallback profile", id, e.user_friendly_message());
            fallback_profile()
        }
    }
}

fn configured_profile(id: &str, monitor: &MonitorConfig, detection: &DetectionConfig) -> MonitorProfile {
    let role = match monitor.main {
        Some(true) => Role::Main,
        Some(false) => Role::Secondary,
        None => Role::Unassigned,
    };

    let desktops = match monitor.workspaces() {
        Some(workspaces) => workspaces.to_vec(),
        None => match role {
            Role::Main => main_desktops(),
            Role::Secondary => secondary_desktops(),
            Role::Unassigned => heuristic_desktops(id, detection),
        },
    };

    MonitorProfile {
        resolution: monitor.resolution(),
        rotation: monitor.rotation(),
        role,
        position: monitor.position(),
        desktops,
        source: ProfileSource::Configured,
    }
}

fn detected_profile(id: &str, native: Resolution, detection: &DetectionConfig) -> MonitorProfile {
    let resolution = if native.is_hidpi() {
        let scaled = native.scaled(detection.hidpi_scale);
        log::info!("{}: HiDPI display detected: {} -> scaled to {}", id, native, scaled);
        scaled
    } else {
        native
    };

    let role = if detection.is_internal_panel(id) {
        Role::Secondary
    } else {
        Role::Main
    };

    MonitorProfile {
        resolution,
        rotation: Rotation::Normal,
        role,
        position: None,
        desktops: heuristic_desktops(id, detection),
        source: ProfileSource::AutoDetected,
    }
}

/// Built-in panels take the upper desktops, external displays the lower ones.
fn heuristic_desktops(id: &str, detection: &DetectionConfig) -> Vec<monsetup_common::DesktopToken> {
    if detection.is_internal_panel(id) {
        secondary_desktops()
    } else {
        main_desktops()
    }
}

pub fn fallback_profile() -> MonitorProfile {
    MonitorProfile {
        resolution: FALLBACK_RESOLUTION,
        rotation: Rotation::Normal,
        role: Role::Unassigned,
        position: None,
        desktops: main_desktops(),
        source: ProfileSource::Fallback,
    }
}
