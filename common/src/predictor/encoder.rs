//! ラベルエンコーダ
//!
//! 分類器の出力インデックスと保全懸念度ラベルを相互変換する。

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// 保全懸念度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConcernTier {
    Low,
    Medium,
    High,
}

impl ConcernTier {
    pub const ALL: [ConcernTier; 3] = [ConcernTier::Low, ConcernTier::Medium, ConcernTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConcernTier::Low => "Low",
            ConcernTier::Medium => "Medium",
            ConcernTier::High => "High",
        }
    }
}

impl fmt::Display for ConcernTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConcernTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ConcernTier::Low),
            "medium" | "moderate" => Ok(ConcernTier::Medium),
            "high" => Ok(ConcernTier::High),
            _ => Err(format!("Unknown tier: {}. Use Low, Medium, or High", s)),
        }
    }
}

#[derive(Deserialize)]
struct EncoderFile {
    classes: Vec<String>,
}

/// 学習済みラベルエンコーダ（クラス順序は学習時のもの）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<ConcernTier>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<ConcernTier>) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::ModelFormat("エンコーダのクラスが空です".into()));
        }
        for (i, tier) in classes.iter().enumerate() {
            if classes[..i].contains(tier) {
                return Err(Error::ModelFormat(format!("クラスが重複しています: {}", tier)));
            }
        }
        Ok(Self { classes })
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み（`{"classes": ["High", "Low", "Medium"]}`）
    pub fn from_json(json: &str) -> Result<Self> {
        let file: EncoderFile = serde_json::from_str(json)?;
        let classes = file
            .classes
            .iter()
            .map(|c| c.parse::<ConcernTier>().map_err(Error::ModelFormat))
            .collect::<Result<Vec<_>>>()?;
        Self::new(classes)
    }

    pub fn classes(&self) -> &[ConcernTier] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn transform(&self, tier: ConcernTier) -> Option<usize> {
        self.classes.iter().position(|c| *c == tier)
    }

    pub fn inverse_transform(&self, index: usize) -> Result<ConcernTier> {
        self.classes
            .get(index)
            .copied()
            .ok_or(Error::UnknownClass(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_keeps_fitted_order() {
        let encoder = LabelEncoder::from_json(r#"{"classes": ["High", "Low", "Medium"]}"#).unwrap();
        assert_eq!(encoder.inverse_transform(0).unwrap(), ConcernTier::High);
        assert_eq!(encoder.inverse_transform(2).unwrap(), ConcernTier::Medium);
        assert_eq!(encoder.transform(ConcernTier::Low), Some(1));
    }

    #[test]
    fn test_inverse_transform_out_of_range() {
        let encoder = LabelEncoder::new(vec![ConcernTier::Low]).unwrap();
        assert!(matches!(encoder.inverse_transform(3), Err(Error::UnknownClass(3))));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = LabelEncoder::from_json(r#"{"classes": ["Low", "Critical"]}"#).unwrap_err();
        assert!(matches!(err, Error::ModelFormat(_)));
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let err = LabelEncoder::new(vec![ConcernTier::Low, ConcernTier::Low]).unwrap_err();
        assert!(matches!(err, Error::ModelFormat(_)));
    }

    #[test]
    fn test_tier_parse_alias() {
        assert_eq!("Moderate".parse::<ConcernTier>().unwrap(), ConcernTier::Medium);
        assert_eq!(" high ".parse::<ConcernTier>().unwrap(), ConcernTier::High);
        assert!("extreme".parse::<ConcernTier>().is_err());
    }
}
