//! 列スキーマ定義
//!
//! データセットの固定列名と、州（地域）列の解決方法をまとめる。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const GROUP: &str = "group";
pub const IUCN_STATUS: &str = "iucn_status";
pub const WLPA_SCHEDULE: &str = "wlpa_schedule";
pub const MIGRATORY_STATUS: &str = "migratory_status";
pub const DIET: &str = "diet";
pub const HABITAT_TYPE: &str = "habitat_type";
pub const ENDEMICITY_TYPE: &str = "endemicity_type";
pub const BIRD_TYPE: &str = "bird_type";
pub const LONG_TERM_STATUS: &str = "long_term_status";
pub const CURRENT_STATUS: &str = "current_status";
pub const DISTRIBUTION_STATUS: &str = "distribution_status";
pub const ANALYSED_LONG_TERM: &str = "analysed_long_term";
pub const ANALYSED_CURRENT: &str = "analysed_current";
pub const LONG_TERM_TREND: &str = "long_term_trend";
pub const CURRENT_ANNUAL_CHANGE: &str = "current_annual_change";

/// 目的変数（保全懸念度）の列
pub const LABEL: &str = "status_of_conservation_concern";

/// 分類器に渡す特徴量の列（順序固定）
pub const FEATURE_COLUMNS: [&str; 15] = [
    GROUP,
    MIGRATORY_STATUS,
    DIET,
    HABITAT_TYPE,
    WLPA_SCHEDULE,
    IUCN_STATUS,
    ANALYSED_LONG_TERM,
    ANALYSED_CURRENT,
    LONG_TERM_TREND,
    CURRENT_ANNUAL_CHANGE,
    LONG_TERM_STATUS,
    CURRENT_STATUS,
    DISTRIBUTION_STATUS,
    ENDEMICITY_TYPE,
    BIRD_TYPE,
];

/// 州列ランキングから除外する整数列
pub const DEFAULT_EXCLUDED_COLUMNS: [&str; 2] = [ANALYSED_CURRENT, ANALYSED_LONG_TERM];

/// 位置指定時の州列の開始インデックス
pub const DEFAULT_STATE_COLUMN_START: usize = 19;

/// 読み込み時に存在を必須とする列
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    FEATURE_COLUMNS.iter().copied().chain(std::iter::once(LABEL))
}

/// 州（地域）列の指定方法
///
/// 列名リストでの明示指定を推奨。位置指定は旧レイアウト互換用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateColumns {
    /// 列名を明示
    Named(Vec<String>),
    /// 指定インデックス以降の全列
    FromIndex(usize),
}

impl Default for StateColumns {
    fn default() -> Self {
        StateColumns::FromIndex(DEFAULT_STATE_COLUMN_START)
    }
}

impl StateColumns {
    /// ヘッダーから州列名を確定する
    pub fn resolve(&self, columns: &[String]) -> Result<Vec<String>> {
        match self {
            StateColumns::Named(names) => {
                for name in names {
                    if !columns.iter().any(|c| c == name) {
                        return Err(Error::MissingColumn(name.clone()));
                    }
                }
                Ok(names.clone())
            }
            StateColumns::FromIndex(start) => Ok(columns.iter().skip(*start).cloned().collect()),
        }
    }
}
