//! 起動から予測・集計までの結合テスト
//!
//! tests/fixtures の小さなデータセットと線形モデルを使う

use bird_concern::config::{ArtifactPaths, Config};
use bird_concern::context::AppContext;
use bird_concern::error::BirdConcernError;
use bird_concern_common::{ConcernTier, FilterSpec, FormState, Panel, PanelView};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn context() -> AppContext {
    let paths = ArtifactPaths {
        dataset: fixture("birds.csv"),
        model: fixture("model.json"),
        encoder: fixture("encoder.json"),
    };
    AppContext::load(&paths, &Config::default()).expect("fixtures should load")
}

fn view(views: &[PanelView], panel: Panel) -> &PanelView {
    views.iter().find(|v| v.panel == panel).expect("panel missing")
}

fn form(ctx: &AppContext) -> FormState {
    FormState::with_defaults(ctx.table()).unwrap()
}

#[test]
fn test_load_fixtures() {
    let ctx = context();
    assert_eq!(ctx.table().len(), 4);
    assert_eq!(ctx.table().state_columns(), &["Kerala".to_string(), "Goa".to_string()]);
    assert_eq!(ctx.predictor().encoder().len(), 3);
}

#[test]
fn test_predict_single_group() {
    let ctx = context();
    let mut form = form(&ctx);
    form.group = vec!["Raptor".into()];

    let result = ctx.predict(&form.collect()).unwrap();
    assert_eq!(result.tier, ConcernTier::High);
}

/// グループ未選択でも予測できる
#[test]
fn test_predict_without_group() {
    let ctx = context();
    let mut form = form(&ctx);
    assert_eq!(ctx.predict(&form.collect()).unwrap().tier, ConcernTier::Low);

    form.set_long_term_trend(-50.0);
    assert_eq!(ctx.predict(&form.collect()).unwrap().tier, ConcernTier::Medium);
}

/// 学習時にない組み合わせはエラーになる
#[test]
fn test_predict_unknown_joined_group() {
    let ctx = context();
    let mut form = form(&ctx);
    form.group = vec!["Passerine".into(), "Raptor".into()];

    let err = ctx.predict(&form.collect()).unwrap_err();
    assert!(matches!(
        err,
        BirdConcernError::Common(bird_concern_common::Error::SchemaMismatch(_))
    ));
}

#[test]
fn test_probabilities_sum_to_one() {
    let ctx = context();
    let probs = ctx.probabilities(&form(&ctx).collect()).unwrap().unwrap();
    let total: f64 = probs.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(probs.len(), 3);
}

#[test]
fn test_summarize_unfiltered() {
    let ctx = context();
    let views = ctx.summarize(&FilterSpec::default()).unwrap();
    assert_eq!(views.len(), Panel::ALL.len());

    let iucn = view(&views, Panel::IucnSplit).table.pairs();
    assert_eq!(
        iucn,
        vec![("EN", 2), ("LC", 1), ("NT", 1)]
    );

    let states = &view(&views, Panel::TopStates).table;
    assert_eq!(states.headers(), &["State".to_string(), "Threatened Count".to_string()]);
    assert_eq!(
        states.pairs(),
        vec![("Goa", 2), ("Kerala", 1)]
    );

    let diet = &view(&views, Panel::DietBirdType).table;
    assert_eq!(diet.headers(), &["diet", "Landbird", "Waterbird"]);
    assert_eq!(diet.rows()[0].labels, vec!["Carnivore"]);
    assert_eq!(diet.rows()[0].counts, vec![2, 0]);
}

/// 州フィルタは全体集計パネル以外にだけ効く
#[test]
fn test_summarize_state_filter() {
    let ctx = context();
    let spec = FilterSpec {
        states: vec!["Kerala".into()],
        ..Default::default()
    };
    let views = ctx.summarize(&spec).unwrap();

    let iucn = view(&views, Panel::IucnSplit).table.pairs();
    assert_eq!(iucn, vec![("LC", 1), ("EN", 1)]);

    let melt = &view(&views, Panel::GroupVsIucn).table;
    assert_eq!(melt.len(), 9);
    assert_eq!(melt.rows()[0].labels, vec!["Raptor", "EN"]);
    assert_eq!(melt.rows()[0].counts, vec![1]);
}

#[test]
fn test_summarize_no_match() {
    let ctx = context();
    let spec = FilterSpec {
        groups: vec!["Raptor".into()],
        migratory: vec!["Resident".into()],
        states: vec!["Goa".into()],
    };
    let views = ctx.summarize(&spec).unwrap();
    assert_eq!(view(&views, Panel::IucnSplit).table.len(), 1);

    let spec = FilterSpec {
        groups: vec!["Passerine".into()],
        states: vec!["Goa".into()],
        ..Default::default()
    };
    let views = ctx.summarize(&spec).unwrap();
    assert!(view(&views, Panel::IucnSplit).table.is_empty());
    assert!(view(&views, Panel::TopStates).table.is_empty());
    assert!(!view(&views, Panel::GroupVsIucn).table.is_empty());
}

#[test]
fn test_load_missing_state_column() {
    let paths = ArtifactPaths {
        dataset: fixture("birds.csv"),
        model: fixture("model.json"),
        encoder: fixture("encoder.json"),
    };
    let config = Config {
        state_columns: Some(vec!["Sikkim".into()]),
        ..Default::default()
    };
    assert!(AppContext::load(&paths, &config).is_err());
}
