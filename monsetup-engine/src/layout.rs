use monsetup_common::{CommandBuilder, Executor, OutputLayout};

use crate::topology::TopologyPlan;

/// The xrandr sections for `plan`: main first and marked primary, then the
/// secondary placed relative to it.
pub fn output_layouts(plan: &TopologyPlan) -> Vec<OutputLayout<'_>> {
    let mut outputs = vec![OutputLayout {
        name: &plan.main.id,
        resolution: plan.main.profile.resolution,
        rotation: plan.main.profile.rotation,
        primary: true,
        relative_to: None,
    }];

    if let Some(secondary) = &plan.secondary {
        outputs.push(OutputLayout {
            name: &secondary.id,
            resolution: secondary.profile.resolution,
            rotation: secondary.profile.rotation,
            primary: false,
            relative_to: Some((plan.position.unwrap_or_default(), &plan.main.id)),
        });
    }

    outputs
}

/// Issue the whole layout as one xrandr call. Not awaited: an invalid mode is
/// rejected by the X server, not here.
pub fn apply_layout(plan: &TopologyPlan, builder: &CommandBuilder, executor: &dyn Executor) {
    let layouts = output_layouts(plan);
    for layout in &layouts {
        log::info!(
            "Set {} to {} (rotate: {}){}",
            layout.name,
            layout.resolution,
            layout.rotation,
            if layout.primary { " as primary" } else { "" }
        );
    }
    executor.dispatch(builder.xrandr_layout(&layouts));
}
