//! Bird Concern Common Library
//!
//! CLIとデスクトップ版で共有される型と集計ロジック

pub mod types;
pub mod schema;
pub mod error;
pub mod dataset;
pub mod input;
pub mod predictor;
pub mod filter;
pub mod aggregate;
pub mod dashboard;

pub use types::{BirdRecord, BirdTable, Cell, ColumnKind};
pub use schema::StateColumns;
pub use error::{Error, Result};
pub use dataset::load_dataset;
pub use input::{CandidateInput, FeatureValue, FormState, NumericBounds};
pub use predictor::{
    Classifier, ConcernTier, FeatureRow, LabelEncoder, LinearClassifier, PredictionResult, Predictor,
};
pub use filter::FilterSpec;
pub use aggregate::{LabelFilter, SummaryRow, SummaryTable};
pub use dashboard::{DashboardSettings, Panel, PanelView};
