//! アプリケーションコンテキスト
//!
//! 起動時にデータセットと分類器を一度だけ読み込み、
//! 各コマンドへ明示的に渡す。読み込み後は変更しない。

use crate::config::{ArtifactPaths, Config};
use crate::error::Result;
use bird_concern_common::dashboard::{self, PanelView};
use bird_concern_common::{
    load_dataset, BirdTable, CandidateInput, ConcernTier, DashboardSettings, FilterSpec,
    LinearClassifier, PredictionResult, Predictor,
};
use std::collections::BTreeMap;
use tracing::info;

pub struct AppContext {
    table: BirdTable,
    predictor: Predictor<LinearClassifier>,
    settings: DashboardSettings,
}

impl AppContext {
    /// 3ファイルを読み込む（いずれか失敗したら起動しない）
    pub fn load(paths: &ArtifactPaths, config: &Config) -> Result<Self> {
        let table = load_dataset(&paths.dataset, &config.state_columns_spec())?;
        let predictor = Predictor::load(&paths.model, &paths.encoder)?;
        info!(
            classes = predictor.encoder().len(),
            "model loaded from {}",
            paths.model.display()
        );
        Ok(Self::new(table, predictor, config.dashboard_settings()))
    }

    pub fn new(
        table: BirdTable,
        predictor: Predictor<LinearClassifier>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            table,
            predictor,
            settings,
        }
    }

    pub fn table(&self) -> &BirdTable {
        &self.table
    }

    pub fn predictor(&self) -> &Predictor<LinearClassifier> {
        &self.predictor
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn predict(&self, input: &CandidateInput) -> Result<PredictionResult> {
        Ok(self.predictor.predict(input)?)
    }

    pub fn probabilities(
        &self,
        input: &CandidateInput,
    ) -> Result<Option<BTreeMap<ConcernTier, f64>>> {
        Ok(self.predictor.probabilities(input)?)
    }

    /// フィルタを適用して全パネルを集計
    pub fn summarize(&self, spec: &FilterSpec) -> Result<Vec<PanelView>> {
        Ok(dashboard::compute(&self.table, spec, &self.settings)?)
    }
}
