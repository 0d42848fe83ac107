use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bird-concern")]
#[command(about = "鳥類の保全懸念度予測・集計ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データセット（CSV/xlsx）
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// 学習済みモデルJSON
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// ラベルエンコーダJSON
    #[arg(long, global = true)]
    pub encoder: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 形質を指定して保全懸念度を予測
    Predict {
        #[command(flatten)]
        traits: TraitArgs,

        /// 対話形式で入力
        #[arg(short, long)]
        interactive: bool,

        /// クラスごとの確率も表示
        #[arg(long)]
        show_probabilities: bool,
    },

    /// フィルタ条件で集計表を表示・出力
    Summary {
        /// グループ（複数指定可）
        #[arg(short, long)]
        group: Vec<String>,

        /// 渡り区分（複数指定可）
        #[arg(short, long)]
        migratory: Vec<String>,

        /// 州列（複数指定可）
        #[arg(short, long)]
        state: Vec<String>,

        /// CSV/Excelの出力先ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (csv/excel/both)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
    },

    /// 列の一覧・値の一覧を表示
    Columns {
        /// 指定列の重複なし値を表示
        #[arg(short, long)]
        unique: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// データセットのパスを保存
        #[arg(long)]
        set_dataset: Option<PathBuf>,

        /// モデルのパスを保存
        #[arg(long)]
        set_model: Option<PathBuf>,

        /// エンコーダのパスを保存
        #[arg(long)]
        set_encoder: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 予測用の形質指定（未指定はデータセットの先頭値）
#[derive(Args, Debug, Clone, Default)]
pub struct TraitArgs {
    /// グループ（複数指定可）
    #[arg(long)]
    pub group: Vec<String>,

    /// 渡り区分（複数指定可）
    #[arg(long)]
    pub migratory: Vec<String>,

    #[arg(long)]
    pub iucn: Option<String>,

    #[arg(long)]
    pub wlpa: Option<String>,

    #[arg(long)]
    pub analysed_long_term: Option<i64>,

    #[arg(long)]
    pub analysed_current: Option<i64>,

    /// 長期トレンド（%）
    #[arg(long, allow_hyphen_values = true)]
    pub long_term_trend: Option<f64>,

    /// 年変化率（%）
    #[arg(long, allow_hyphen_values = true)]
    pub current_annual_change: Option<f64>,

    #[arg(long)]
    pub long_term_status: Option<String>,

    #[arg(long)]
    pub current_status: Option<String>,

    #[arg(long)]
    pub distribution_status: Option<String>,

    #[arg(long)]
    pub diet: Option<String>,

    #[arg(long)]
    pub habitat: Option<String>,

    #[arg(long)]
    pub endemic: Option<String>,

    #[arg(long)]
    pub bird_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}
