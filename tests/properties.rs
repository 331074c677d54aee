use std::sync::Arc;

use quakeview::{
    chart_records, sort_descending, ChartRecord, Dashboard, DashboardConfig, Intent, LayerName, LayerStore, MemoryWidget,
    Metric, OverlayName, OverlayPolicy, Page, Registry, SizeClasses, ViewState,
};
use proptest::prelude::*;
use serde_json::json;

const REGIONS: &[&str] = &["Ourika", "Asni", "Amizmiz", "Tahannaout", "Atlantis"];
const CLASSES: &[&str] = &["Très petit", "Petit", "Moyen", "Grand", "Énorme"];

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        (0..REGIONS.len()).prop_map(|i| Intent::SelectRegion(REGIONS[i].to_string())),
        any::<bool>().prop_map(|b| Intent::ToggleLayer(if b { LayerName::Boundaries } else { LayerName::Buildings })),
        any::<bool>().prop_map(|b| Intent::ToggleOverlay(if b { OverlayName::Stats } else { OverlayName::Charts })),
        (0..CLASSES.len()).prop_map(|i| Intent::ToggleSizeClass(CLASSES[i].to_string())),
        (0..Metric::ALL.len()).prop_map(|i| Intent::SetMetric(Metric::ALL[i])),
        Just(Intent::ResetView),
    ]
}

fn policy_strategy() -> impl Strategy<Value = OverlayPolicy> {
    prop_oneof![Just(OverlayPolicy::Independent), Just(OverlayPolicy::Exclusive)]
}

fn store(policy: OverlayPolicy) -> LayerStore {
    LayerStore::new(Arc::new(Registry::al_haouz()), Arc::new(SizeClasses::default()), policy)
}

/// Host actions against a mounted dashboard.
#[derive(Clone, Debug)]
enum Step {
    Dispatch(Intent),
    /// Resolve the `n`-th outstanding fetch (modulo the count), successfully or not.
    Resolve { n: usize, ok: bool },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => intent_strategy().prop_map(Step::Dispatch),
        2 => (any::<usize>(), any::<bool>()).prop_map(|(n, ok)| Step::Resolve { n, ok }),
    ]
}

fn buildings_bytes() -> Vec<u8> {
    serde_json::to_vec(&json!({ "type": "FeatureCollection", "features": [
        { "type": "Feature", "properties": { "area_in_meters": 42.0 }, "geometry": null },
        { "type": "Feature", "properties": { "area_in_meters": 420.0 }, "geometry": null },
    ]})).unwrap()
}

proptest! {
    #[test]
    fn buildings_imply_a_selected_region(policy in policy_strategy(), intents in prop::collection::vec(intent_strategy(), 0..60)) {
        let mut store = store(policy);
        for intent in intents {
            store.dispatch(intent);
            let state = store.state();
            prop_assert!(!state.layers().buildings || state.selected_region().is_some());
        }
    }

    #[test]
    fn hiding_boundaries_clears_selection(intents in prop::collection::vec(intent_strategy(), 0..40)) {
        let mut store = store(OverlayPolicy::Independent);
        for intent in intents {
            store.dispatch(intent);
        }
        if store.state().layers().boundaries {
            store.dispatch(Intent::ToggleLayer(LayerName::Boundaries));
            let state = store.state();
            prop_assert_eq!(state.selected_region(), None);
            prop_assert!(!state.layers().buildings);
        }
    }

    #[test]
    fn size_class_toggle_is_its_own_inverse(
        intents in prop::collection::vec(intent_strategy(), 0..40),
        class in 0..CLASSES.len(),
    ) {
        let mut store = store(OverlayPolicy::Independent);
        for intent in intents {
            store.dispatch(intent);
        }
        let before = store.state().active_size_classes().clone();
        store.dispatch(Intent::ToggleSizeClass(CLASSES[class].to_string()));
        store.dispatch(Intent::ToggleSizeClass(CLASSES[class].to_string()));
        prop_assert_eq!(store.state().active_size_classes(), &before);
    }

    #[test]
    fn reset_reaches_the_default_from_anywhere(
        policy in policy_strategy(),
        intents in prop::collection::vec(intent_strategy(), 0..60),
    ) {
        let mut store = store(policy);
        for intent in intents {
            store.dispatch(intent);
        }
        store.dispatch(Intent::ResetView);
        prop_assert_eq!(store.state(), &ViewState::initial(&SizeClasses::default()));
    }

    #[test]
    fn poverty_order_is_independent_of_table_order(
        shuffled in Just(chart_records(Metric::PovertyRate)).prop_shuffle(),
    ) {
        let sorted = sort_descending(shuffled);
        prop_assert!(sorted.windows(2).all(|w| w[0].value >= w[1].value));
        let values: Vec<f64> = sorted.iter().map(|r| r.value).collect();
        let expected: Vec<f64> = chart_records(Metric::PovertyRate).iter().map(|r| r.value).collect();
        prop_assert_eq!(values, expected);
        prop_assert_eq!(sort_descending(sorted.clone()), sorted);
    }

    #[test]
    fn at_most_one_buildings_layer_on_the_map(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let widget = MemoryWidget::new();
        let (mut dashboard, report) = Dashboard::mount(Page::Overview, &DashboardConfig::default(), widget.clone()).unwrap();
        let mut outstanding = report.fetches;

        for step in steps {
            let report = match step {
                Step::Dispatch(intent) => dashboard.dispatch(intent),
                Step::Resolve { n, ok } => {
                    if outstanding.is_empty() {
                        continue;
                    }
                    let fetch = outstanding.remove(n % outstanding.len());
                    let result = if ok {
                        Ok(match fetch.kind {
                            quakeview::FetchKind::Boundaries => serde_json::to_vec(&json!({ "type": "FeatureCollection", "features": [] })).unwrap(),
                            quakeview::FetchKind::Buildings { .. } => buildings_bytes(),
                            quakeview::FetchKind::Hazard { .. } => unreachable!("the overview offers no ground-motion layers"),
                        })
                    } else {
                        Err(anyhow::anyhow!("unreachable host"))
                    };
                    dashboard.complete_fetch(fetch.ticket, result)
                }
            };
            outstanding.extend(report.fetches);

            let state = dashboard.state();
            prop_assert!(!state.layers().buildings || state.selected_region().is_some());
            let buildings_layers = widget.layer_ids().iter().filter(|id| id.starts_with("buildings")).count();
            prop_assert!(buildings_layers <= 1);
            if !state.layers().boundaries {
                prop_assert!(widget.source_ids().is_empty());
            }
        }
    }
}

#[test]
fn ties_keep_registry_order() {
    let records = vec![ChartRecord::new("b", 1.0), ChartRecord::new("a", 1.0)];
    let names: Vec<_> = sort_descending(records).into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["b", "a"]);
}
