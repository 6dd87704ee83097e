// End-to-end: CSV on disk -> state -> live panels -> export

use std::io::Write;

use esg_core::analytics::export::{write_records, ExportFormat};
use esg_core::analytics::{Draw, FixedVariation, Snapshot, NOT_AVAILABLE};
use esg_core::config::{PanelSettings, Settings};
use esg_core::data::Selection;
use esg_core::live::{SchedulerState, TickBudget};
use esg_core::render::{console::render_frame, Category, ChannelRenderer};
use esg_core::service::{AppState, PanelPlan};

const CSV: &str = "\u{feff}Unnamed: 0,Country Name,Country Code,Indicator Name,Indicator Code,2020,2021,2022
0,Wakanda,WAK,Adjusted savings: natural resources depletion (% of GNI),NY.ADJ.DRES.GN.ZS,10,,30
1,Wakanda,WAK,Access to electricity (% of population),EG.ELC.ACCS.ZS,90,95,n/a
2,Genovia,GEN,Adjusted savings: natural resources depletion (% of GNI),NY.ADJ.DRES.GN.ZS,1,2,3
";

fn state_with(configure: impl FnOnce(&mut Settings)) -> (AppState, tempfile::NamedTempFile) {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();

    let mut settings = Settings::load(None).unwrap();
    settings.dataset.path = file.path().to_string_lossy().into_owned();
    settings.scheduler.delay_ms = 0;
    configure(&mut settings);
    (AppState::new(settings).unwrap(), file)
}

fn state(panels: Vec<PanelSettings>, ticks: u64) -> (AppState, tempfile::NamedTempFile) {
    state_with(|settings| {
        settings.scheduler.ticks = ticks;
        settings.panels = panels;
    })
}

#[tokio::test]
async fn test_legacy_panel_runs_budget() {
    let (state, _file) = state(Vec::new(), 3);
    assert_eq!(state.settings.tick_budget(), TickBudget::Bounded(3));

    let plans = state.panel_plans().unwrap();
    let (renderer, mut rx) = ChannelRenderer::pair(8);
    let session = state.open_panel(
        &plans[0],
        Box::new(renderer),
        FixedVariation::new(vec![Draw { offset: 1, multiplier: 2 }, Draw { offset: 3, multiplier: 4 }]),
    );

    let report = session.task.await.unwrap();
    assert_eq!(report.state, SchedulerState::Stopped);
    assert_eq!(report.ticks, 3);

    let mut snapshots: Vec<Snapshot> = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        snapshots.push(snapshot);
    }
    assert_eq!(snapshots.len(), 3);

    // Both Wakanda rows; the blank 2021 cell and "n/a" are dropped
    let first = &snapshots[0];
    assert_eq!(first.selection, Selection::legacy("Wakanda"));
    assert_eq!(first.records.len(), 4);
    assert_eq!(first.kpis.latest_year.value, Some(30.0));
    assert_eq!(first.kpis.average, Some((10.0 + 30.0 + 90.0 + 95.0) / 4.0));
    assert!(!first.is_degraded());

    let frame = render_frame(first, &Category::Legacy.theme(), 10);
    assert!(frame.contains("Latest Year Data (2022)"));
}

#[tokio::test]
async fn test_panels_export_combined_records() {
    let panels = vec![
        PanelSettings {
            category: Category::Economic,
            entity: Some("WAK".to_string()),
            metric: Some("NY.ADJ.DRES.GN.ZS".to_string()),
        },
        PanelSettings {
            category: Category::Social,
            entity: Some("Genovia".to_string()),
            metric: None,
        },
    ];
    let (state, _file) = state(panels, 1);

    let mut snapshots = Vec::new();
    for plan in state.panel_plans().unwrap() {
        let (renderer, mut rx) = ChannelRenderer::pair(1);
        let session = state.open_panel(&plan, Box::new(renderer), FixedVariation::constant(0, 1));
        snapshots.push(rx.recv().await.unwrap());
        assert_eq!(session.task.await.unwrap().ticks, 1);
    }

    assert_eq!(snapshots[0].records.len(), 2);
    assert_eq!(snapshots[1].records.len(), 3);

    let mut out = Vec::new();
    let written = write_records(&mut out, &snapshots, ExportFormat::JsonArray).unwrap();
    assert_eq!(written, 5);

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows[0]["Country Name"], "Wakanda");
    assert_eq!(rows[0]["Indicator Code"], "NY.ADJ.DRES.GN.ZS");
    assert_eq!(rows[4]["Country Name"], "Genovia");
    assert_eq!(rows[4]["Year"], 2022);
    assert_eq!(rows[4]["Natural Resources Depletion"], 3.0);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_entity_then_switch() {
    let (state, _file) = state_with(|settings| {
        settings.scheduler.unbounded = true;
        settings.scheduler.delay_ms = 1000;
    });

    let plan = PanelPlan {
        category: Category::Governance,
        selection: Selection::legacy("Atlantis"),
    };
    let (renderer, mut rx) = ChannelRenderer::pair(4);
    let session = state.open_panel(&plan, Box::new(renderer), FixedVariation::constant(0, 1));

    let empty = rx.recv().await.unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.kpis.average, None);
    let frame = render_frame(&empty, &Category::Governance.theme(), 10);
    assert!(frame.contains(NOT_AVAILABLE));

    state.registry.select(session.id, Selection::legacy("Genovia"));
    let next = rx.recv().await.unwrap();
    assert_eq!(next.tick, 2);
    assert_eq!(next.records.len(), 3);

    state.registry.close_all();
    assert_eq!(session.task.await.unwrap().state, SchedulerState::Cancelled);
}
