use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use bird_concern::config::Config;
use bird_concern::context::AppContext;
use bird_concern::export::csv::write_summary_csv;
use bird_concern_common::SummaryTable;

/// 引数（データセット モデル エンコーダ）または設定ファイルから読み込む
pub fn load_context(args: &[PathBuf]) -> Result<AppContext> {
    let config = Config::load().context("load config")?;
    let (dataset, model, encoder) = match args {
        [] => (None, None, None),
        [d, m, e] => (Some(d.as_path()), Some(m.as_path()), Some(e.as_path())),
        _ => bail!("usage: bird-concern-desktop [DATASET MODEL ENCODER]"),
    };

    let paths = config
        .resolve_paths(dataset, model, encoder)
        .context("resolve dataset/model paths")?;
    let ctx = AppContext::load(&paths, &config)
        .with_context(|| format!("load {}", paths.dataset.display()))?;
    info!(
        rows = ctx.table().len(),
        states = ctx.table().state_columns().len(),
        "dashboard ready: {}",
        paths.dataset.display()
    );
    Ok(ctx)
}

pub fn save_csv(path: &Path, table: &SummaryTable) -> Result<()> {
    write_summary_csv(table, path).with_context(|| format!("write {}", path.display()))?;
    info!(rows = table.len(), "csv saved: {}", path.display());
    Ok(())
}
