//! 端末表示モジュール

use bird_concern_common::{ConcernTier, PanelView, SummaryTable};
use std::collections::BTreeMap;

const BAR_WIDTH: usize = 30;

/// 集計表を整形（列幅を揃える）
pub fn format_table(table: &SummaryTable) -> String {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|r| {
            r.labels
                .iter()
                .cloned()
                .chain(r.counts.iter().map(|c| c.to_string()))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = table.headers().iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(table.headers()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    out
}

/// 2列の表を横棒グラフで表示
pub fn format_bars(table: &SummaryTable) -> String {
    let pairs = table.pairs();
    let max = pairs.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let label_width = pairs.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, count) in pairs {
        let len = if max > 0 {
            ((count.max(0) as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<width$}  {} {}\n",
            label,
            "█".repeat(len),
            count,
            width = label_width
        ));
    }
    out
}

pub fn print_panel(view: &PanelView) {
    println!("■ {}", view.panel.title());
    if view.table.is_empty() {
        println!("  (該当データなし)\n");
        return;
    }
    if view.table.headers().len() == 2 {
        print!("{}", format_bars(&view.table));
        println!();
    }
    print!("{}", format_table(&view.table));
    println!();
}

pub fn print_prediction(tier: ConcernTier) {
    println!("✅ Predicted Conservation Concern: {}", tier);
}

pub fn print_probabilities(probs: &BTreeMap<ConcernTier, f64>) {
    println!("Prediction Probabilities:");
    for (tier, p) in probs {
        println!("  {:<6} {:.3}", tier.as_str(), p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bird_concern_common::SummaryRow;

    fn table() -> SummaryTable {
        SummaryTable::new(
            vec!["iucn_status".into(), "count".into()],
            vec![
                SummaryRow { labels: vec!["LC".into()], counts: vec![20] },
                SummaryRow { labels: vec!["NT".into()], counts: vec![10] },
            ],
        )
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let text = format_table(&table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "iucn_status  count");
        assert_eq!(lines[1], "-----------  -----");
        assert_eq!(lines[2], "LC           20");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_format_bars_scales_to_max() {
        let text = format_bars(&table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_format_bars_empty() {
        let empty = SummaryTable::new(vec!["a".into(), "count".into()], vec![]);
        assert!(format_bars(&empty).is_empty());
    }
}
