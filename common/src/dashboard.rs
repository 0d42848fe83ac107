//! ダッシュボードのパネル定義
//!
//! 5つのグラフパネルと、それぞれの集計・CSVファイル名をまとめる。

use crate::aggregate::{self, LabelFilter, SummaryTable};
use crate::error::Result;
use crate::filter::{self, FilterSpec};
use crate::schema::*;
use crate::types::BirdTable;

/// グラフパネル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    IucnSplit,
    MigrationSplit,
    DietBirdType,
    TopStates,
    GroupVsIucn,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::IucnSplit,
        Panel::MigrationSplit,
        Panel::DietBirdType,
        Panel::TopStates,
        Panel::GroupVsIucn,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::IucnSplit => "IUCN Status split",
            Panel::MigrationSplit => "Migratory Status split",
            Panel::DietBirdType => "Diet vs Bird Type",
            Panel::TopStates => "Top 10 Threatened States",
            Panel::GroupVsIucn => "Top 10 Bird Groups vs IUCN Status",
        }
    }

    /// CSVダウンロード時のファイル名
    pub fn file_name(&self) -> &'static str {
        match self {
            Panel::IucnSplit => "iucn_split.csv",
            Panel::MigrationSplit => "migration_split.csv",
            Panel::DietBirdType => "diet_birdtype.csv",
            Panel::TopStates => "top_10_states.csv",
            Panel::GroupVsIucn => "group_vs_iucn.csv",
        }
    }

    /// Excelシート名（31文字以内）
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Panel::IucnSplit => "iucn_split",
            Panel::MigrationSplit => "migration_split",
            Panel::DietBirdType => "diet_birdtype",
            Panel::TopStates => "top_10_states",
            Panel::GroupVsIucn => "group_vs_iucn",
        }
    }

    /// フィルタ前の全データで集計するパネル
    pub fn uses_full_table(&self) -> bool {
        matches!(self, Panel::GroupVsIucn)
    }
}

/// 集計設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub top_n: usize,
    pub exclude_columns: Vec<String>,
    pub low_label: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            exclude_columns: DEFAULT_EXCLUDED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            low_label: "Low".to_string(),
        }
    }
}

/// パネルと集計結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub panel: Panel,
    pub table: SummaryTable,
}

/// 1パネル分を集計
pub fn compute_panel(
    panel: Panel,
    full: &BirdTable,
    filtered: &BirdTable,
    settings: &DashboardSettings,
) -> Result<SummaryTable> {
    let source = if panel.uses_full_table() { full } else { filtered };

    match panel {
        Panel::IucnSplit => aggregate::distribution(source, IUCN_STATUS),
        Panel::MigrationSplit => aggregate::distribution(source, MIGRATORY_STATUS),
        Panel::DietBirdType => aggregate::crosstab(source, DIET, BIRD_TYPE),
        Panel::TopStates => {
            let label_filter = LabelFilter {
                column: LABEL.to_string(),
                excluded_value: settings.low_label.clone(),
            };
            Ok(aggregate::ranked_top_n(
                source,
                &settings.exclude_columns,
                &label_filter,
                settings.top_n,
            )?
            .with_headers(&["State", "Threatened Count"]))
        }
        Panel::GroupVsIucn => aggregate::grouped_melt(source, GROUP, IUCN_STATUS, settings.top_n),
    }
}

/// フィルタを適用して全パネルを集計
pub fn compute(
    base: &BirdTable,
    spec: &FilterSpec,
    settings: &DashboardSettings,
) -> Result<Vec<PanelView>> {
    let filtered = filter::apply(base, spec)?;
    Panel::ALL
        .iter()
        .map(|&panel| {
            Ok(PanelView {
                panel,
                table: compute_panel(panel, base, &filtered, settings)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn table() -> BirdTable {
        let text = |s: &str| Cell::Text(s.to_string());
        let columns = vec![
            GROUP, MIGRATORY_STATUS, IUCN_STATUS, DIET, BIRD_TYPE, LABEL, ANALYSED_CURRENT, "Kerala",
        ];
        BirdTable::new(
            columns.into_iter().map(String::from).collect(),
            vec![
                vec![text("Passerine"), text("Resident"), text("LC"), text("Insectivore"), text("Landbird"), text("Low"), Cell::Int(10), Cell::Int(1)],
                vec![text("Passerine"), text("Migrant"), text("NT"), text("Omnivore"), text("Landbird"), text("High"), Cell::Int(20), Cell::Int(1)],
                vec![text("Raptor"), text("Resident"), text("LC"), text("Carnivore"), text("Raptor"), text("Medium"), Cell::Int(30), Cell::Int(0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_file_names() {
        let names: Vec<&str> = Panel::ALL.iter().map(|p| p.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "iucn_split.csv",
                "migration_split.csv",
                "diet_birdtype.csv",
                "top_10_states.csv",
                "group_vs_iucn.csv"
            ]
        );
    }

    #[test]
    fn test_compute_all_panels() {
        let views = compute(&table(), &FilterSpec::default(), &DashboardSettings::default()).unwrap();
        assert_eq!(views.len(), 5);

        let top = &views[3];
        assert_eq!(top.panel, Panel::TopStates);
        assert_eq!(top.table.headers(), &["State", "Threatened Count"].map(String::from));
        // analysed_current は除外、Low 行は集計しない
        assert_eq!(top.table.pairs(), vec![("Kerala", 1)]);
    }

    #[test]
    fn test_group_vs_iucn_ignores_filter() {
        let spec = FilterSpec {
            groups: vec!["Raptor".into()],
            ..Default::default()
        };
        let views = compute(&table(), &spec, &DashboardSettings::default()).unwrap();
        assert_eq!(views[0].table.pairs(), vec![("LC", 1)]);

        let melt = &views[4].table;
        assert!(melt.rows().iter().any(|r| r.labels[0] == "Passerine"));
    }

    #[test]
    fn test_filter_matching_nothing() {
        let spec = FilterSpec {
            groups: vec!["Waterfowl".into()],
            ..Default::default()
        };
        let views = compute(&table(), &spec, &DashboardSettings::default()).unwrap();
        for view in views.iter().filter(|v| !v.panel.uses_full_table()) {
            assert!(view.table.is_empty(), "{:?} should be empty", view.panel);
        }
    }
}
