//! 予測アダプタ
//!
//! 学習済み分類器は差し替え可能な外部アーティファクトとして扱い、
//! ここでは「候補レコード → 保全懸念度ラベル」の変換だけを担う。

mod encoder;
mod linear;

pub use encoder::{ConcernTier, LabelEncoder};
pub use linear::{FeatureSpec, LinearClassifier};

use crate::error::{Error, Result};
use crate::input::{CandidateInput, FeatureValue};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 分類器に渡す1行の表
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn from_pairs(pairs: Vec<(String, FeatureValue)>) -> Self {
        let (columns, values) = pairs.into_iter().unzip();
        Self { columns, values }
    }

    pub fn from_candidate(input: &CandidateInput) -> Self {
        Self::from_pairs(
            input
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// 分類器インターフェース
pub trait Classifier {
    /// 学習時の特徴量名
    fn feature_names(&self) -> &[String];

    fn n_classes(&self) -> usize;

    /// 符号化済みクラスインデックスを返す
    fn predict(&self, row: &FeatureRow) -> Result<usize>;

    /// クラスごとの確率。未対応の分類器は None
    fn predict_proba(&self, _row: &FeatureRow) -> Result<Option<Vec<f64>>> {
        Ok(None)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn feature_names(&self) -> &[String] {
        (**self).feature_names()
    }

    fn n_classes(&self) -> usize {
        (**self).n_classes()
    }

    fn predict(&self, row: &FeatureRow) -> Result<usize> {
        (**self).predict(row)
    }

    fn predict_proba(&self, row: &FeatureRow) -> Result<Option<Vec<f64>>> {
        (**self).predict_proba(row)
    }
}

/// 予測結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionResult {
    pub tier: ConcernTier,
    /// 分類器の生の出力
    pub encoded: usize,
}

/// 分類器とラベルエンコーダの組
#[derive(Debug, Clone)]
pub struct Predictor<C = LinearClassifier> {
    classifier: C,
    encoder: LabelEncoder,
}

impl Predictor<LinearClassifier> {
    /// モデルとエンコーダのJSONを読み込む
    pub fn load(model_path: &Path, encoder_path: &Path) -> Result<Self> {
        let classifier = LinearClassifier::from_file(model_path)?;
        let encoder = LabelEncoder::from_file(encoder_path)?;
        Self::new(classifier, encoder)
    }
}

impl<C: Classifier> Predictor<C> {
    pub fn new(classifier: C, encoder: LabelEncoder) -> Result<Self> {
        if classifier.n_classes() != encoder.len() {
            return Err(Error::ModelFormat(format!(
                "分類器のクラス数 {} とエンコーダのクラス数 {} が一致しません",
                classifier.n_classes(),
                encoder.len()
            )));
        }
        Ok(Self { classifier, encoder })
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// 候補レコードを学習時のスキーマに合わせた1行にする
    fn to_row(&self, input: &CandidateInput) -> Result<FeatureRow> {
        let row = FeatureRow::from_candidate(input);
        let missing: Vec<&str> = self
            .classifier
            .feature_names()
            .iter()
            .filter(|name| row.get(name).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(Error::SchemaMismatch(format!(
                "列がありません: {}",
                missing.join(", ")
            )));
        }
        Ok(row)
    }

    /// 保全懸念度を予測
    pub fn predict(&self, input: &CandidateInput) -> Result<PredictionResult> {
        let row = self.to_row(input)?;
        let encoded = self.classifier.predict(&row)?;
        let tier = self.encoder.inverse_transform(encoded)?;
        debug!(encoded, %tier, "prediction");
        Ok(PredictionResult { tier, encoded })
    }

    /// ラベルごとの確率（分類器が対応している場合のみ）
    pub fn probabilities(
        &self,
        input: &CandidateInput,
    ) -> Result<Option<BTreeMap<ConcernTier, f64>>> {
        let row = self.to_row(input)?;
        let Some(probs) = self.classifier.predict_proba(&row)? else {
            return Ok(None);
        };
        let mut map = BTreeMap::new();
        for (i, p) in probs.into_iter().enumerate() {
            map.insert(self.encoder.inverse_transform(i)?, p);
        }
        Ok(Some(map))
    }
}
