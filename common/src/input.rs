//! 入力フォームモジュール
//!
//! ウィジェットの選択状態から分類器に渡す1件分の候補レコードを組み立てる。
//! 数値入力は範囲内に丸めて保持するため、下流で範囲チェックは行わない。

use crate::error::Result;
use crate::schema::*;
use crate::types::BirdTable;
use std::fmt;

/// 特徴量の値
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Text(String),
    Int(i64),
    Float(f64),
    /// 複数選択で何も選ばれていない
    Unselected,
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Text(s) => write!(f, "{}", s),
            FeatureValue::Int(i) => write!(f, "{}", i),
            FeatureValue::Float(v) => write!(f, "{}", v),
            FeatureValue::Unselected => write!(f, "(未選択)"),
        }
    }
}

/// 数値入力の範囲
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
}

impl NumericBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min.max(0.0).min(self.max);
        }
        value.clamp(self.min, self.max)
    }

    pub fn clamp_int(&self, value: i64) -> i64 {
        value.clamp(self.min as i64, self.max as i64)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const ANALYSED_BOUNDS: NumericBounds = NumericBounds::new(0.0, 1000.0);
pub const LONG_TERM_TREND_BOUNDS: NumericBounds = NumericBounds::new(-100.0, 200.0);
pub const CURRENT_ANNUAL_CHANGE_BOUNDS: NumericBounds = NumericBounds::new(-50.0, 200.0);

/// 複数選択をカンマ区切りの1文字列にまとめる
pub fn join_selection(values: &[String]) -> FeatureValue {
    if values.is_empty() {
        FeatureValue::Unselected
    } else {
        FeatureValue::Text(values.join(","))
    }
}

/// 分類器に渡す候補レコード（目的変数を除く特徴量）
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateInput {
    fields: Vec<(&'static str, FeatureValue)>,
}

impl CandidateInput {
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// フォームの選択状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub group: Vec<String>,
    pub migratory_status: Vec<String>,
    pub iucn_status: String,
    pub wlpa_schedule: String,
    pub long_term_status: String,
    pub current_status: String,
    pub distribution_status: String,
    pub diet: String,
    pub habitat_type: String,
    pub endemicity_type: String,
    pub bird_type: String,
    analysed_long_term: i64,
    analysed_current: i64,
    long_term_trend: f64,
    current_annual_change: f64,
}

impl FormState {
    /// 各単一選択の初期値を先頭の値にしたフォーム
    pub fn with_defaults(table: &BirdTable) -> Result<Self> {
        let first = |column: &str| -> Result<String> {
            Ok(table.unique(column)?.into_iter().next().unwrap_or_default())
        };

        Ok(Self {
            iucn_status: first(IUCN_STATUS)?,
            wlpa_schedule: first(WLPA_SCHEDULE)?,
            long_term_status: first(LONG_TERM_STATUS)?,
            current_status: first(CURRENT_STATUS)?,
            distribution_status: first(DISTRIBUTION_STATUS)?,
            diet: first(DIET)?,
            habitat_type: first(HABITAT_TYPE)?,
            endemicity_type: first(ENDEMICITY_TYPE)?,
            bird_type: first(BIRD_TYPE)?,
            ..Default::default()
        })
    }

    /// 単一選択フィールドへの可変参照（列名で指定）
    pub fn single_select_mut(&mut self, column: &str) -> Option<&mut String> {
        match column {
            IUCN_STATUS => Some(&mut self.iucn_status),
            WLPA_SCHEDULE => Some(&mut self.wlpa_schedule),
            LONG_TERM_STATUS => Some(&mut self.long_term_status),
            CURRENT_STATUS => Some(&mut self.current_status),
            DISTRIBUTION_STATUS => Some(&mut self.distribution_status),
            DIET => Some(&mut self.diet),
            HABITAT_TYPE => Some(&mut self.habitat_type),
            ENDEMICITY_TYPE => Some(&mut self.endemicity_type),
            BIRD_TYPE => Some(&mut self.bird_type),
            _ => None,
        }
    }

    pub fn analysed_long_term(&self) -> i64 {
        self.analysed_long_term
    }

    pub fn analysed_current(&self) -> i64 {
        self.analysed_current
    }

    pub fn long_term_trend(&self) -> f64 {
        self.long_term_trend
    }

    pub fn current_annual_change(&self) -> f64 {
        self.current_annual_change
    }

    pub fn set_analysed_long_term(&mut self, value: i64) {
        self.analysed_long_term = ANALYSED_BOUNDS.clamp_int(value);
    }

    pub fn set_analysed_current(&mut self, value: i64) {
        self.analysed_current = ANALYSED_BOUNDS.clamp_int(value);
    }

    pub fn set_long_term_trend(&mut self, value: f64) {
        self.long_term_trend = LONG_TERM_TREND_BOUNDS.clamp(value);
    }

    pub fn set_current_annual_change(&mut self, value: f64) {
        self.current_annual_change = CURRENT_ANNUAL_CHANGE_BOUNDS.clamp(value);
    }

    /// 候補レコードを生成
    pub fn collect(&self) -> CandidateInput {
        let text = |s: &str| FeatureValue::Text(s.to_string());

        CandidateInput {
            fields: vec![
                (GROUP, join_selection(&self.group)),
                (MIGRATORY_STATUS, join_selection(&self.migratory_status)),
                (DIET, text(&self.diet)),
                (HABITAT_TYPE, text(&self.habitat_type)),
                (WLPA_SCHEDULE, text(&self.wlpa_schedule)),
                (IUCN_STATUS, text(&self.iucn_status)),
                (ANALYSED_LONG_TERM, FeatureValue::Int(self.analysed_long_term)),
                (ANALYSED_CURRENT, FeatureValue::Int(self.analysed_current)),
                (LONG_TERM_TREND, FeatureValue::Float(self.long_term_trend)),
                (CURRENT_ANNUAL_CHANGE, FeatureValue::Float(self.current_annual_change)),
                (LONG_TERM_STATUS, text(&self.long_term_status)),
                (CURRENT_STATUS, text(&self.current_status)),
                (DISTRIBUTION_STATUS, text(&self.distribution_status)),
                (ENDEMICITY_TYPE, text(&self.endemicity_type)),
                (BIRD_TYPE, text(&self.bird_type)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_multiple_groups() {
        let form = FormState {
            group: vec!["Passerine".into(), "Waterfowl".into()],
            ..Default::default()
        };
        let input = form.collect();
        assert_eq!(
            input.get(GROUP),
            Some(&FeatureValue::Text("Passerine,Waterfowl".into()))
        );
    }

    #[test]
    fn test_join_single_value_has_no_separator() {
        assert_eq!(
            join_selection(&["Raptor".to_string()]),
            FeatureValue::Text("Raptor".into())
        );
    }

    #[test]
    fn test_empty_selection_is_unselected() {
        let input = FormState::default().collect();
        assert_eq!(input.get(MIGRATORY_STATUS), Some(&FeatureValue::Unselected));
    }

    #[test]
    fn test_collect_has_all_features_in_order() {
        let input = FormState::default().collect();
        let names: Vec<&str> = input.iter().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
        assert!(input.get(LABEL).is_none());
    }

    #[test]
    fn test_numeric_setters_clamp() {
        let mut form = FormState::default();
        form.set_analysed_long_term(5000);
        form.set_analysed_current(-4);
        form.set_long_term_trend(-150.0);
        form.set_current_annual_change(250.0);

        assert_eq!(form.analysed_long_term(), 1000);
        assert_eq!(form.analysed_current(), 0);
        assert_eq!(form.long_term_trend(), -100.0);
        assert_eq!(form.current_annual_change(), 200.0);
    }

    #[test]
    fn test_nan_is_clamped_into_range() {
        let mut form = FormState::default();
        form.set_current_annual_change(f64::NAN);
        assert!(CURRENT_ANNUAL_CHANGE_BOUNDS.contains(form.current_annual_change()));
    }

    #[test]
    fn test_single_select_mut() {
        let mut form = FormState::default();
        *form.single_select_mut(DIET).unwrap() = "Piscivore".into();
        assert_eq!(form.diet, "Piscivore");
        assert!(form.single_select_mut(GROUP).is_none());
    }
}
