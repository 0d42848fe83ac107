//! 線形分類器（JSONアーティファクト）
//!
//! カテゴリ列はワンホット、数値列は標準化してから
//! クラスごとの係数で線形スコアを計算する。

use super::{Classifier, FeatureRow};
use crate::error::{Error, Result};
use crate::input::FeatureValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_scale() -> f64 {
    1.0
}

/// 特徴量の符号化定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    Categorical {
        name: String,
        categories: Vec<String>,
    },
    Numeric {
        name: String,
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

impl FeatureSpec {
    pub fn name(&self) -> &str {
        match self {
            FeatureSpec::Categorical { name, .. } | FeatureSpec::Numeric { name, .. } => name,
        }
    }

    /// 符号化後の次元数
    fn width(&self) -> usize {
        match self {
            FeatureSpec::Categorical { categories, .. } => categories.len(),
            FeatureSpec::Numeric { .. } => 1,
        }
    }

    fn encode_into(&self, value: &FeatureValue, out: &mut Vec<f64>) -> Result<()> {
        match self {
            FeatureSpec::Categorical { name, categories } => {
                let start = out.len();
                out.resize(start + categories.len(), 0.0);
                let text = match value {
                    // 未選択は全ゼロのブロックとして扱う
                    FeatureValue::Unselected => return Ok(()),
                    other => other.to_string(),
                };
                let pos = categories.iter().position(|c| *c == text).ok_or_else(|| {
                    Error::SchemaMismatch(format!("{} に未知のカテゴリ: {}", name, text))
                })?;
                out[start + pos] = 1.0;
            }
            FeatureSpec::Numeric { name, mean, scale } => {
                let x = match value {
                    FeatureValue::Int(i) => *i as f64,
                    FeatureValue::Float(f) => *f,
                    FeatureValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                        Error::SchemaMismatch(format!("{} は数値が必要です: {}", name, s))
                    })?,
                    FeatureValue::Unselected => {
                        return Err(Error::SchemaMismatch(format!("{} が未入力です", name)))
                    }
                };
                out.push((x - mean) / scale);
            }
        }
        Ok(())
    }
}

/// 学習済み線形分類器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    features: Vec<FeatureSpec>,
    /// クラスごとの係数（行 = クラス）
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    #[serde(skip)]
    feature_names: Vec<String>,
}

impl LinearClassifier {
    pub fn new(
        features: Vec<FeatureSpec>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self> {
        let mut model = Self {
            features,
            coefficients,
            intercepts,
            feature_names: Vec::new(),
        };
        model.validate()?;
        model.feature_names = model.features.iter().map(|f| f.name().to_string()).collect();
        Ok(model)
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: LinearClassifier = serde_json::from_str(json)?;
        Self::new(raw.features, raw.coefficients, raw.intercepts)
    }

    fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::ModelFormat("特徴量定義が空です".into()));
        }
        if self.intercepts.is_empty() {
            return Err(Error::ModelFormat("クラスがありません".into()));
        }
        if self.coefficients.len() != self.intercepts.len() {
            return Err(Error::ModelFormat(format!(
                "係数の行数 {} と切片の数 {} が一致しません",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }

        let width = self.encoded_width();
        if let Some((i, row)) = self
            .coefficients
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
        {
            return Err(Error::ModelFormat(format!(
                "クラス{}の係数の長さ {} が符号化後の次元 {} と一致しません",
                i,
                row.len(),
                width
            )));
        }

        for spec in &self.features {
            if let FeatureSpec::Numeric { name, scale, .. } = spec {
                if *scale == 0.0 || !scale.is_finite() {
                    return Err(Error::ModelFormat(format!("{} のスケールが不正です", name)));
                }
            }
        }
        Ok(())
    }

    pub fn encoded_width(&self) -> usize {
        self.features.iter().map(FeatureSpec::width).sum()
    }

    /// 1行を符号化
    pub fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(self.encoded_width());
        for spec in &self.features {
            let value = row
                .get(spec.name())
                .ok_or_else(|| Error::SchemaMismatch(format!("列がありません: {}", spec.name())))?;
            spec.encode_into(value, &mut out)?;
        }
        Ok(out)
    }

    /// クラスごとの線形スコア
    pub fn decision_function(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let x = self.encode(row)?;
        Ok(self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(coef, b)| b + coef.iter().zip(&x).map(|(w, v)| w * v).sum::<f64>())
            .collect())
    }
}

impl Classifier for LinearClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn n_classes(&self) -> usize {
        self.intercepts.len()
    }

    fn predict(&self, row: &FeatureRow) -> Result<usize> {
        let scores = self.decision_function(row)?;
        // 同点は先頭のクラス
        let mut best = 0;
        for (i, s) in scores.iter().enumerate() {
            if *s > scores[best] {
                best = i;
            }
        }
        Ok(best)
    }

    fn predict_proba(&self, row: &FeatureRow) -> Result<Option<Vec<f64>>> {
        let scores = self.decision_function(row)?;
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        Ok(Some(exps.into_iter().map(|e| e / total).collect()))
    }
}
