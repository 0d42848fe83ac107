//! 集計モジュール
//!
//! グラフ用の小さな集計表を作る純粋関数群。
//! 対象行が0件の場合はエラーではなく空の表を返す。

use crate::error::Result;
use crate::types::{BirdTable, ColumnKind};
use std::collections::{BTreeSet, HashMap};

/// 集計表の1行（ラベル列 + 件数列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub labels: Vec<String>,
    pub counts: Vec<i64>,
}

/// 集計表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    headers: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new(headers: Vec<String>, rows: Vec<SummaryRow>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// ヘッダー名を差し替える（列数が合わない場合はそのまま）
    pub fn with_headers(mut self, headers: &[&str]) -> Self {
        if headers.len() == self.headers.len() {
            self.headers = headers.iter().map(|h| h.to_string()).collect();
        }
        self
    }

    /// (ラベル, 件数) の組として取得（2列の表向け）
    pub fn pairs(&self) -> Vec<(&str, i64)> {
        self.rows
            .iter()
            .filter_map(|r| Some((r.labels.first()?.as_str(), *r.counts.first()?)))
            .collect()
    }

    /// CSVバイト列（UTF-8、ヘッダー行あり）
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            let record: Vec<String> = row
                .labels
                .iter()
                .cloned()
                .chain(row.counts.iter().map(|c| c.to_string()))
                .collect();
            writer.write_record(&record)?;
        }
        writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}

/// 出現順を保ったカウンタ
struct OrderedCounter {
    order: Vec<String>,
    counts: HashMap<String, i64>,
}

impl OrderedCounter {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            counts: HashMap::new(),
        }
    }

    fn add(&mut self, key: String, n: i64) {
        if !self.counts.contains_key(&key) {
            self.order.push(key.clone());
        }
        *self.counts.entry(key).or_insert(0) += n;
    }

    /// 件数の降順（同数は出現順）
    fn ranked(&self) -> Vec<(String, i64)> {
        let mut items: Vec<(String, i64)> = self
            .order
            .iter()
            .map(|k| (k.clone(), self.counts[k]))
            .collect();
        items.sort_by(|a, b| b.1.cmp(&a.1));
        items
    }
}

/// 列の値ごとの件数（件数の降順）
pub fn distribution(table: &BirdTable, column: &str) -> Result<SummaryTable> {
    let mut counter = OrderedCounter::new();
    for cell in table.column_values(column)? {
        if !cell.is_empty() {
            counter.add(cell.to_string(), 1);
        }
    }

    let rows = counter
        .ranked()
        .into_iter()
        .map(|(label, count)| SummaryRow {
            labels: vec![label],
            counts: vec![count],
        })
        .collect();

    Ok(SummaryTable::new(vec![column.to_string(), "count".to_string()], rows))
}

/// 2列のペアを数える（どちらかが空の行は除外）
fn pair_counts(
    table: &BirdTable,
    row_col: &str,
    col_col: &str,
) -> Result<Vec<(String, String)>> {
    let a = table.column_index(row_col)?;
    let b = table.column_index(col_col)?;
    Ok(table
        .records()
        .filter(|r| !r.at(a).is_empty() && !r.at(b).is_empty())
        .map(|r| (r.at(a).to_string(), r.at(b).to_string()))
        .collect())
}

/// クロス集計（行・列ラベルとも昇順、列ごとに横持ち）
pub fn crosstab(table: &BirdTable, row_col: &str, col_col: &str) -> Result<SummaryTable> {
    let pairs = pair_counts(table, row_col, col_col)?;

    let row_labels: BTreeSet<&str> = pairs.iter().map(|(r, _)| r.as_str()).collect();
    let col_labels: Vec<&str> = pairs
        .iter()
        .map(|(_, c)| c.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells: HashMap<(&str, &str), i64> = HashMap::new();
    for (r, c) in &pairs {
        *cells.entry((r.as_str(), c.as_str())).or_insert(0) += 1;
    }

    let headers = std::iter::once(row_col.to_string())
        .chain(col_labels.iter().map(|c| c.to_string()))
        .collect();

    let rows = row_labels
        .into_iter()
        .map(|r| SummaryRow {
            labels: vec![r.to_string()],
            counts: col_labels
                .iter()
                .map(|c| cells.get(&(r, *c)).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    Ok(SummaryTable::new(headers, rows))
}

/// ランキング対象行の条件（ラベル列が指定値と異なる行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    pub column: String,
    pub excluded_value: String,
}

/// 整数列の合計ランキング上位n件
pub fn ranked_top_n(
    table: &BirdTable,
    exclude_columns: &[String],
    label_filter: &LabelFilter,
    n: usize,
) -> Result<SummaryTable> {
    let headers = vec!["column".to_string(), "sum".to_string()];
    let label_idx = table.column_index(&label_filter.column)?;

    let rows: Vec<_> = table
        .records()
        .filter(|r| r.at(label_idx).to_string() != label_filter.excluded_value)
        .collect();
    if rows.is_empty() {
        return Ok(SummaryTable::new(headers, Vec::new()));
    }

    let mut sums: Vec<(String, i64)> = Vec::new();
    for column in table.columns_of_kind(ColumnKind::Int) {
        if exclude_columns.iter().any(|c| c == column) {
            continue;
        }
        let idx = table.column_index(column)?;
        let total = rows.iter().filter_map(|r| r.at(idx).as_int()).sum();
        sums.push((column.to_string(), total));
    }

    sums.sort_by(|a, b| b.1.cmp(&a.1));
    sums.truncate(n);

    let rows = sums
        .into_iter()
        .map(|(label, sum)| SummaryRow {
            labels: vec![label],
            counts: vec![sum],
        })
        .collect();
    Ok(SummaryTable::new(headers, rows))
}

/// 上位n グループ × 系列の件数を縦持ちにする
///
/// 出力順は系列（昇順）ごとに、グループを件数順に並べる。
pub fn grouped_melt(
    table: &BirdTable,
    group_col: &str,
    series_col: &str,
    n: usize,
) -> Result<SummaryTable> {
    let headers = vec![
        group_col.to_string(),
        series_col.to_string(),
        "count".to_string(),
    ];
    let pairs = pair_counts(table, group_col, series_col)?;

    let mut totals = OrderedCounter::new();
    let mut cells: HashMap<(&str, &str), i64> = HashMap::new();
    for (g, s) in &pairs {
        totals.add(g.clone(), 1);
        *cells.entry((g.as_str(), s.as_str())).or_insert(0) += 1;
    }

    let mut groups = totals.ranked();
    groups.truncate(n);

    let series: BTreeSet<&str> = pairs.iter().map(|(_, s)| s.as_str()).collect();

    let mut rows = Vec::with_capacity(series.len() * groups.len());
    for s in &series {
        for (g, _) in &groups {
            rows.push(SummaryRow {
                labels: vec![g.clone(), s.to_string()],
                counts: vec![cells.get(&(g.as_str(), *s)).copied().unwrap_or(0)],
            });
        }
    }

    Ok(SummaryTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    /// group, iucn_status, diet, bird_type, status, A, B, analysed_current
    fn table() -> BirdTable {
        let row = |g: &str, i: &str, d: &str, b: &str, s: &str, a: i64, bb: i64, ac: i64| {
            vec![text(g), text(i), text(d), text(b), text(s), Cell::Int(a), Cell::Int(bb), Cell::Int(ac)]
        };
        BirdTable::new(
            vec![
                "group".into(),
                "iucn_status".into(),
                "diet".into(),
                "bird_type".into(),
                "status_of_conservation_concern".into(),
                "A".into(),
                "B".into(),
                "analysed_current".into(),
            ],
            vec![
                row("Passerine", "LC", "Insectivore", "Landbird", "High", 1, 0, 50),
                row("Passerine", "NT", "Omnivore", "Landbird", "Medium", 0, 0, 60),
                row("Raptor", "LC", "Carnivore", "Raptor", "High", 1, 1, 70),
            ],
        )
        .unwrap()
    }

    fn low_filter() -> LabelFilter {
        LabelFilter {
            column: "status_of_conservation_concern".into(),
            excluded_value: "Low".into(),
        }
    }

    #[test]
    fn test_distribution_example() {
        let dist = distribution(&table(), "iucn_status").unwrap();
        assert_eq!(dist.pairs(), vec![("LC", 2), ("NT", 1)]);
        assert_eq!(dist.headers(), &["iucn_status".to_string(), "count".to_string()]);
    }

    #[test]
    fn test_distribution_sums_to_len() {
        let t = table();
        let dist = distribution(&t, "group").unwrap();
        let total: i64 = dist.pairs().iter().map(|(_, c)| c).sum();
        assert_eq!(total as usize, t.len());
    }

    #[test]
    fn test_distribution_ties_keep_encounter_order() {
        let dist = distribution(&table(), "diet").unwrap();
        assert_eq!(
            dist.pairs(),
            vec![("Insectivore", 1), ("Omnivore", 1), ("Carnivore", 1)]
        );
    }

    #[test]
    fn test_crosstab_shape_and_marginals() {
        let t = table();
        let ct = crosstab(&t, "group", "iucn_status").unwrap();
        assert_eq!(ct.headers(), &["group", "LC", "NT"].map(String::from));
        assert_eq!(ct.rows()[0].labels, vec!["Passerine"]);
        assert_eq!(ct.rows()[0].counts, vec![1, 1]);
        assert_eq!(ct.rows()[1].counts, vec![1, 0]);

        // 行和 = distribution(group)
        let dist = distribution(&t, "group").unwrap();
        for row in ct.rows() {
            let expected = dist
                .pairs()
                .into_iter()
                .find(|(l, _)| *l == row.labels[0])
                .map(|(_, c)| c)
                .unwrap();
            assert_eq!(row.counts.iter().sum::<i64>(), expected);
        }

        // 列和 = distribution(iucn_status)
        let col_dist = distribution(&t, "iucn_status").unwrap();
        for (j, label) in ct.headers()[1..].iter().enumerate() {
            let col_sum: i64 = ct.rows().iter().map(|r| r.counts[j]).sum();
            let expected = col_dist
                .pairs()
                .into_iter()
                .find(|(l, _)| l == label)
                .map(|(_, c)| c)
                .unwrap();
            assert_eq!(col_sum, expected);
        }
    }

    #[test]
    fn test_ranked_top_n_example() {
        let excluded = vec!["analysed_current".to_string()];
        let ranked = ranked_top_n(&table(), &excluded, &low_filter(), 10).unwrap();
        assert_eq!(ranked.pairs(), vec![("A", 2), ("B", 1)]);
    }

    #[test]
    fn test_ranked_top_n_excludes_low_rows() {
        let filter = LabelFilter {
            column: "status_of_conservation_concern".into(),
            excluded_value: "High".into(),
        };
        let excluded = vec!["analysed_current".to_string()];
        let ranked = ranked_top_n(&table(), &excluded, &filter, 10).unwrap();
        assert_eq!(ranked.pairs(), vec![("A", 0), ("B", 0)]);
    }

    #[test]
    fn test_ranked_top_n_truncates_and_sorts() {
        let ranked = ranked_top_n(&table(), &[], &low_filter(), 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.pairs()[0], ("analysed_current", 180));
        let counts: Vec<i64> = ranked.pairs().iter().map(|(_, c)| *c).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_grouped_melt_long_form() {
        let melt = grouped_melt(&table(), "group", "iucn_status", 10).unwrap();
        assert_eq!(melt.headers(), &["group", "iucn_status", "count"].map(String::from));
        let rows: Vec<(Vec<String>, i64)> = melt
            .rows()
            .iter()
            .map(|r| (r.labels.clone(), r.counts[0]))
            .collect();
        assert_eq!(
            rows,
            vec![
                (vec!["Passerine".to_string(), "LC".to_string()], 1),
                (vec!["Raptor".to_string(), "LC".to_string()], 1),
                (vec!["Passerine".to_string(), "NT".to_string()], 1),
                (vec!["Raptor".to_string(), "NT".to_string()], 0),
            ]
        );
    }

    #[test]
    fn test_grouped_melt_keeps_top_n_groups() {
        let melt = grouped_melt(&table(), "group", "iucn_status", 1).unwrap();
        let groups: BTreeSet<&str> = melt.rows().iter().map(|r| r.labels[0].as_str()).collect();
        assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec!["Passerine"]);
    }

    /// 境界で同数のときは先に出たグループが残る
    #[test]
    fn test_grouped_melt_tie_at_cut_keeps_first_seen() {
        let t = BirdTable::new(
            vec!["group".into(), "iucn_status".into()],
            vec![
                vec![text("C"), text("LC")],
                vec![text("B"), text("LC")],
                vec![text("B"), text("NT")],
                vec![text("A"), text("LC")],
            ],
        )
        .unwrap();

        let melt = grouped_melt(&t, "group", "iucn_status", 2).unwrap();
        let groups: BTreeSet<&str> = melt.rows().iter().map(|r| r.labels[0].as_str()).collect();
        assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec!["B", "C"]);

        for series in ["LC", "NT"] {
            let order: Vec<&str> = melt
                .rows()
                .iter()
                .filter(|r| r.labels[1] == series)
                .map(|r| r.labels[0].as_str())
                .collect();
            assert_eq!(order, vec!["B", "C"], "series {}", series);
        }
        assert_eq!(melt.len(), 4);
    }

    #[test]
    fn test_empty_table_gives_empty_summaries() {
        let empty = table().select_rows(&[]);
        assert!(distribution(&empty, "iucn_status").unwrap().is_empty());
        assert!(crosstab(&empty, "diet", "bird_type").unwrap().is_empty());
        assert!(ranked_top_n(&empty, &[], &low_filter(), 10).unwrap().is_empty());
        assert!(grouped_melt(&empty, "group", "iucn_status", 10).unwrap().is_empty());
    }

    #[test]
    fn test_csv_bytes() {
        let dist = distribution(&table(), "iucn_status").unwrap();
        let csv = String::from_utf8(dist.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(csv, "iucn_status,count\nLC,2\nNT,1\n");
    }

    #[test]
    fn test_with_headers() {
        let ranked = ranked_top_n(&table(), &[], &low_filter(), 3)
            .unwrap()
            .with_headers(&["State", "Threatened Count"]);
        assert_eq!(ranked.headers()[0], "State");
        // 列数が合わない場合は変更しない
        let same = ranked.clone().with_headers(&["only"]);
        assert_eq!(same.headers(), ranked.headers());
    }
}
