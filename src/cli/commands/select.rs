//! Select command implementation
//!
//! Replays a list of selection actions against the catalog and prints the
//! resulting id sets.

use super::shared::{emit, open_catalog, to_json};
use crate::app::models::EntityKind;
use crate::app::services::catalog::CatalogStore;
use crate::app::services::resolver::RelationshipResolver;
use crate::app::services::selection::SelectionManager;
use crate::cli::args::{OutputFormat, SelectArgs, SelectionAction};
use crate::config::Config;
use crate::constants::DATE_FORMAT;
use crate::Result;
use colored::*;
use serde_json::json;
use tracing::{debug, info};

pub fn run_select(args: SelectArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let store = open_catalog(config)?;
    let manager = replay(&store, &args.actions)?;

    emit(
        format,
        || Ok(human_report(&manager)),
        || json_report(&manager),
    )
}

/// Apply one action to the selection
pub fn apply_action<R: RelationshipResolver>(
    manager: &mut SelectionManager<R>,
    action: &SelectionAction,
) -> Result<()> {
    debug!("Applying selection action {:?}", action);
    match *action {
        SelectionAction::Date(date) => manager.select_date(date),
        SelectionAction::ClearDate => {
            manager.clear_date();
            Ok(())
        }
        SelectionAction::Field(kind) => {
            manager.select_field(kind);
            Ok(())
        }
        SelectionAction::Add(kind, id) => manager.add_to_selection(kind, id),
        SelectionAction::Select(kind, id) => manager.select(kind, id),
        SelectionAction::Clear => manager.clear_all(),
    }
}

/// Fresh selection over `store` with `actions` applied in order
pub fn replay<'a>(
    store: &'a CatalogStore,
    actions: &[SelectionAction],
) -> Result<SelectionManager<&'a CatalogStore>> {
    let mut manager = SelectionManager::new(store);
    for action in actions {
        apply_action(&mut manager, action)?;
    }
    info!(
        "Applied {} selection actions from {}",
        actions.len(),
        store.path().display()
    );
    Ok(manager)
}

fn human_report<R: RelationshipResolver>(manager: &SelectionManager<R>) -> String {
    let active = manager
        .active_kind()
        .map(|kind| kind.label().to_string())
        .unwrap_or_else(|| "none".to_string());
    let date = manager
        .selected_date()
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "none".to_string());

    let mut output = format!(
        "{}\n{} {}\n{} {}\n",
        "Selection".bright_green().bold(),
        "Active type:".bright_cyan(),
        active,
        "Date filter:".bright_cyan(),
        date
    );

    for kind in EntityKind::ALL {
        let ids = manager.selected(kind);
        let listed: Vec<String> = ids.sorted().iter().map(|id| id.to_string()).collect();
        output.push_str(&format!(
            "{:<12} {:>5}  {}\n",
            format!("{}s", kind.table_name()),
            ids.len(),
            listed.join(" ")
        ));
    }
    output
}

fn json_report<R: RelationshipResolver>(manager: &SelectionManager<R>) -> Result<String> {
    let report = json!({
        "active": manager.active_kind(),
        "date": manager.selected_date().map(|d| d.format(DATE_FORMAT).to_string()),
        "stations": manager.selected_stations().sorted(),
        "sitechans": manager.selected_sitechans().sorted(),
        "sensors": manager.selected_sensors().sorted(),
        "instruments": manager.selected_instruments().sorted(),
    });
    to_json(&report, "selection report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::catalog::tests::{create_test_catalog, date, ids};

    #[test]
    fn test_replay_applies_actions_in_order() {
        let (_temp_dir, store) = create_test_catalog();
        let actions = [
            SelectionAction::Date(date(2012, 6, 1)),
            SelectionAction::Add(EntityKind::Instrument, 200),
        ];

        // Instrument 200 is in the date view, so the add keeps that view
        let manager = replay(&store, &actions).unwrap();
        assert_eq!(manager.active_kind(), Some(EntityKind::Instrument));
        assert_eq!(manager.selected_instruments(), &ids(&[100, 200]));
        assert_eq!(manager.selected_sensors(), &ids(&[1000, 2000]));
        assert_eq!(manager.selected_stations(), &ids(&[1, 2]));

        let actions = [
            SelectionAction::Date(date(2012, 6, 1)),
            SelectionAction::Add(EntityKind::Instrument, 200),
            SelectionAction::Select(EntityKind::Instrument, 200),
        ];

        let manager = replay(&store, &actions).unwrap();
        assert_eq!(manager.active_kind(), Some(EntityKind::Instrument));
        assert_eq!(manager.selected_instruments().as_slice(), &[200]);
        assert_eq!(manager.selected_sensors(), &ids(&[2000]));
        assert_eq!(manager.selected_stations(), &ids(&[2]));
    }

    #[test]
    fn test_field_and_clear_actions() {
        let (_temp_dir, store) = create_test_catalog();
        let actions = [
            SelectionAction::Add(EntityKind::Station, 1),
            SelectionAction::Field(EntityKind::Sensor),
        ];
        let mut manager = replay(&store, &actions).unwrap();
        assert!(manager.selected_stations().is_empty());

        apply_action(&mut manager, &SelectionAction::Date(date(2020, 6, 15))).unwrap();
        apply_action(&mut manager, &SelectionAction::Clear).unwrap();
        assert_eq!(manager.active_kind(), None);
        assert_eq!(manager.selected_stations(), &ids(&[1, 3]));

        apply_action(&mut manager, &SelectionAction::ClearDate).unwrap();
        assert!(manager.selected_stations().is_empty());
    }

    #[test]
    fn test_json_report_lists_sorted_ids() {
        let (_temp_dir, store) = create_test_catalog();
        let manager = replay(&store, &[SelectionAction::Add(EntityKind::Station, 1)]).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&json_report(&manager).unwrap()).unwrap();
        assert_eq!(report["active"], "station");
        assert_eq!(report["date"], serde_json::Value::Null);
        assert_eq!(report["sitechans"], json!([10, 11]));
        assert_eq!(report["instruments"], json!([100, 200, 300]));
    }

    #[test]
    fn test_human_report_counts_each_type() {
        let (_temp_dir, store) = create_test_catalog();
        let manager = replay(&store, &[SelectionAction::Select(EntityKind::Station, 2)]).unwrap();

        let report = human_report(&manager);
        assert!(report.contains("Active type:"));
        assert!(report.contains(" none\n"));
        assert!(report.contains("stations"));
        assert!(report.contains("20"));
    }
}
