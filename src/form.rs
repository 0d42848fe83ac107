//! 入力フォームモジュール
//!
//! CLI引数または対話入力から FormState を組み立てる。
//! 選択肢はすべてデータセットの列の値から作る。

use crate::cli::TraitArgs;
use crate::error::{BirdConcernError, Result};
use bird_concern_common::input::{
    ANALYSED_BOUNDS, CURRENT_ANNUAL_CHANGE_BOUNDS, LONG_TERM_TREND_BOUNDS,
};
use bird_concern_common::schema::*;
use bird_concern_common::{BirdTable, FormState, NumericBounds};
use dialoguer::{Input, MultiSelect, Select};

/// 単一選択フィールド（列名, 表示名）
const SINGLE_SELECTS: &[(&str, &str)] = &[
    (IUCN_STATUS, "IUCN Status"),
    (WLPA_SCHEDULE, "WLPA Schedule"),
    (LONG_TERM_STATUS, "Long-Term Status"),
    (CURRENT_STATUS, "Current Status"),
    (DISTRIBUTION_STATUS, "Distribution Status"),
    (DIET, "Diet"),
    (HABITAT_TYPE, "Habitat Type"),
    (ENDEMICITY_TYPE, "Endemicity Type"),
    (BIRD_TYPE, "Bird Type"),
];

/// 値が列の選択肢に含まれるか確認
fn check_choice(table: &BirdTable, column: &str, value: &str) -> Result<()> {
    if table.unique(column)?.iter().any(|v| v == value) {
        Ok(())
    } else {
        Err(BirdConcernError::Config(format!(
            "{} に '{}' はありません（`bird-concern columns --unique {}` で確認）",
            column, value, column
        )))
    }
}

fn check_numeric(name: &str, value: f64, bounds: NumericBounds) -> Result<()> {
    if bounds.contains(value) {
        Ok(())
    } else {
        Err(BirdConcernError::Config(format!(
            "{} は {} 〜 {} の範囲で指定してください: {}",
            name, bounds.min, bounds.max, value
        )))
    }
}

/// CLI引数からフォームを作成
pub fn from_args(table: &BirdTable, args: &TraitArgs) -> Result<FormState> {
    let mut form = FormState::with_defaults(table)?;

    for g in &args.group {
        check_choice(table, GROUP, g)?;
    }
    for m in &args.migratory {
        check_choice(table, MIGRATORY_STATUS, m)?;
    }
    form.group = args.group.clone();
    form.migratory_status = args.migratory.clone();

    let singles: [(&str, &Option<String>); 9] = [
        (IUCN_STATUS, &args.iucn),
        (WLPA_SCHEDULE, &args.wlpa),
        (LONG_TERM_STATUS, &args.long_term_status),
        (CURRENT_STATUS, &args.current_status),
        (DISTRIBUTION_STATUS, &args.distribution_status),
        (DIET, &args.diet),
        (HABITAT_TYPE, &args.habitat),
        (ENDEMICITY_TYPE, &args.endemic),
        (BIRD_TYPE, &args.bird_type),
    ];
    for (column, value) in singles {
        if let Some(value) = value {
            check_choice(table, column, value)?;
            if let Some(slot) = form.single_select_mut(column) {
                *slot = value.clone();
            }
        }
    }

    if let Some(v) = args.analysed_long_term {
        check_numeric(ANALYSED_LONG_TERM, v as f64, ANALYSED_BOUNDS)?;
        form.set_analysed_long_term(v);
    }
    if let Some(v) = args.analysed_current {
        check_numeric(ANALYSED_CURRENT, v as f64, ANALYSED_BOUNDS)?;
        form.set_analysed_current(v);
    }
    if let Some(v) = args.long_term_trend {
        check_numeric(LONG_TERM_TREND, v, LONG_TERM_TREND_BOUNDS)?;
        form.set_long_term_trend(v);
    }
    if let Some(v) = args.current_annual_change {
        check_numeric(CURRENT_ANNUAL_CHANGE, v, CURRENT_ANNUAL_CHANGE_BOUNDS)?;
        form.set_current_annual_change(v);
    }

    Ok(form)
}

fn prompt_multi(table: &BirdTable, column: &str, label: &str) -> Result<Vec<String>> {
    let items = table.unique(column)?;
    let chosen = MultiSelect::new()
        .with_prompt(format!("{} (スペースで選択、Enterで確定)", label))
        .items(&items)
        .interact()?;
    Ok(chosen.into_iter().map(|i| items[i].clone()).collect())
}

fn prompt_single(table: &BirdTable, column: &str, label: &str) -> Result<String> {
    let items = table.unique(column)?;
    if items.is_empty() {
        return Ok(String::new());
    }
    let idx = Select::new()
        .with_prompt(label)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(items[idx].clone())
}

fn prompt_number(label: &str, bounds: NumericBounds) -> Result<f64> {
    let value = Input::<f64>::new()
        .with_prompt(format!("{} [{} 〜 {}]", label, bounds.min, bounds.max))
        .default(0.0)
        .validate_with(move |v: &f64| -> std::result::Result<(), String> {
            if bounds.contains(*v) {
                Ok(())
            } else {
                Err(format!("{} 〜 {} の範囲で入力してください", bounds.min, bounds.max))
            }
        })
        .interact_text()?;
    Ok(value)
}

fn prompt_integer(label: &str, bounds: NumericBounds) -> Result<i64> {
    let value = Input::<i64>::new()
        .with_prompt(format!("{} [{} 〜 {}]", label, bounds.min, bounds.max))
        .default(0)
        .validate_with(move |v: &i64| -> std::result::Result<(), String> {
            if bounds.contains(*v as f64) {
                Ok(())
            } else {
                Err(format!("{} 〜 {} の範囲で入力してください", bounds.min, bounds.max))
            }
        })
        .interact_text()?;
    Ok(value)
}

/// 対話形式でフォームを入力
pub fn collect_interactive(table: &BirdTable) -> Result<FormState> {
    println!("🐦 形質を入力してください\n");

    let mut form = FormState::default();
    form.group = prompt_multi(table, GROUP, "Group")?;
    form.migratory_status = prompt_multi(table, MIGRATORY_STATUS, "Migratory Status")?;

    for (column, label) in SINGLE_SELECTS {
        let value = prompt_single(table, column, label)?;
        if let Some(slot) = form.single_select_mut(column) {
            *slot = value;
        }
    }

    form.set_analysed_long_term(prompt_integer("Analysed Long-Term", ANALYSED_BOUNDS)?);
    form.set_analysed_current(prompt_integer("Analysed Current", ANALYSED_BOUNDS)?);
    form.set_long_term_trend(prompt_number("Long-Term Trend (%)", LONG_TERM_TREND_BOUNDS)?);
    form.set_current_annual_change(prompt_number(
        "Current Annual Change (%)",
        CURRENT_ANNUAL_CHANGE_BOUNDS,
    )?);

    Ok(form)
}
