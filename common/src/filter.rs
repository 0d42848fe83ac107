//! フィルタモジュール
//!
//! グループ・渡り区分・州列の選択を AND 条件で適用する。
//! 空の選択は制約なしとして扱う。

use crate::error::Result;
use crate::schema::{GROUP, MIGRATORY_STATUS};
use crate::types::BirdTable;
use tracing::debug;

/// フィルタ条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub groups: Vec<String>,
    pub migratory: Vec<String>,
    /// 選択した州列（合計 > 0 の行を残す）
    pub states: Vec<String>,
}

impl FilterSpec {
    pub fn is_identity(&self) -> bool {
        self.groups.is_empty() && self.migratory.is_empty() && self.states.is_empty()
    }
}

/// フィルタを適用して新しい表を返す（元の表は変更しない）
pub fn apply(table: &BirdTable, spec: &FilterSpec) -> Result<BirdTable> {
    if spec.is_identity() {
        return Ok(table.clone());
    }

    let group_idx = table.column_index(GROUP)?;
    let migratory_idx = table.column_index(MIGRATORY_STATUS)?;
    let state_idx = spec
        .states
        .iter()
        .map(|s| table.column_index(s))
        .collect::<Result<Vec<_>>>()?;

    let indices: Vec<usize> = table
        .records()
        .filter(|r| spec.groups.is_empty() || contains(&spec.groups, &r.at(group_idx).to_string()))
        .filter(|r| {
            spec.migratory.is_empty() || contains(&spec.migratory, &r.at(migratory_idx).to_string())
        })
        .filter(|r| {
            state_idx.is_empty()
                || state_idx
                    .iter()
                    .map(|&i| r.at(i).as_number().unwrap_or(0.0))
                    .sum::<f64>()
                    > 0.0
        })
        .map(|r| r.index())
        .collect();

    debug!(before = table.len(), after = indices.len(), "filter applied");
    Ok(table.select_rows(&indices))
}

fn contains(set: &[String], value: &str) -> bool {
    set.iter().any(|s| s == value)
}
