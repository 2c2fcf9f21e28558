use monsetup_common::{CommandBuilder, Executor, MonitorMode};
use monsetup_config::Config;

/// Replace the placement rules with the ones configured for `mode`. Returns
/// how many rules were dispatched.
///
/// Rules for every application named in either mode are removed first, and
/// each removal is awaited so it lands before the new rules.
pub fn install_rules(
    mode: MonitorMode,
    config: &Config,
    builder: &CommandBuilder,
    executor: &dyn Executor,
) -> usize {
    for app in config.rule_apps() {
        if let Err(e) = executor.query(builder.bspc_remove_rule(app)) {
            log::debug!("Could not clear rules for {}: {}", app, e);
        }
    }

    let Some(rules) = config.rules(mode) else {
        log::debug!("No placement rules configured for {} monitor mode", mode);
        return 0;
    };

    for (app, rule) in rules {
        executor.dispatch(builder.bspc_add_rule(
            app,
            rule.desktop.as_deref(),
            rule.follow.as_deref(),
        ));
    }

    log::info!("Installed {} placement rules for {} monitor mode", rules.len(), mode);
    rules.len()
}
