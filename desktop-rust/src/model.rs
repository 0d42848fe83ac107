use bird_concern_common::{ConcernTier, FilterSpec, FormState, PanelView};

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Tier(ConcernTier),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub form: FormState,
    pub states: Vec<String>,
    pub prediction: Option<PredictionOutcome>,
    pub views: Vec<PanelView>,
    /// views の集計に使った条件
    pub applied: Option<FilterSpec>,
    pub status: String,
}

impl DashboardState {
    /// グループ・渡り区分の選択はフィルタと予測入力で共通
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            groups: self.form.group.clone(),
            migratory: self.form.migratory_status.clone(),
            states: self.states.clone(),
        }
    }

    pub fn needs_refresh(&self) -> bool {
        self.applied.as_ref() != Some(&self.filter_spec())
    }

    /// 入力が変わったら前回の予測は表示しない
    pub fn inputs_changed(&mut self) {
        self.prediction = None;
    }
}
