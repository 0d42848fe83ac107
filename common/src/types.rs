//! データセットの型定義
//!
//! - Cell: 1セルの値
//! - BirdTable: 読み込んだ表全体（起動後は読み取り専用）
//! - BirdRecord: 1行分のビュー

use crate::error::{Error, Result};
use crate::schema::StateColumns;
use std::collections::HashSet;
use std::fmt;

/// セル値
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// 文字列からセルを推定（整数 → 浮動小数 → 文字列の順）
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }
        Cell::Text(trimmed.to_string())
    }

    /// 文字列セル（数値推定なし）
    pub fn parse_text(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// 数値として取得
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Empty => Ok(()),
        }
    }
}

/// 列の型（表全体から推定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 全セルが整数（空セルなし）
    Int,
    /// 全セルが数値、または空セルを含む数値列
    Float,
    Text,
}

impl ColumnKind {
    fn infer<'a>(cells: impl Iterator<Item = &'a Cell>) -> ColumnKind {
        let mut has_empty = false;
        let mut has_float = false;
        for cell in cells {
            match cell {
                Cell::Int(_) => {}
                Cell::Float(_) => has_float = true,
                Cell::Empty => has_empty = true,
                Cell::Text(_) => return ColumnKind::Text,
            }
        }
        if has_float || has_empty {
            ColumnKind::Float
        } else {
            ColumnKind::Int
        }
    }
}

/// 鳥類データセット
#[derive(Debug, Clone, PartialEq)]
pub struct BirdTable {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    rows: Vec<Vec<Cell>>,
    state_columns: Vec<String>,
}

impl BirdTable {
    /// ヘッダーと行から表を構築し、列の型を推定する
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::Dataset("ヘッダー行がありません".into()));
        }

        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::Dataset(format!("列名が重複しています: {}", name)));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::Dataset(format!(
                    "{}行目の列数が不正です（期待 {}, 実際 {}）",
                    i + 2,
                    columns.len(),
                    row.len()
                )));
            }
        }

        let kinds = (0..columns.len())
            .map(|c| ColumnKind::infer(rows.iter().map(|r| &r[c])))
            .collect();

        Ok(Self {
            columns,
            kinds,
            rows,
            state_columns: Vec::new(),
        })
    }

    /// 州列を確定する
    pub fn with_state_columns(mut self, spec: &StateColumns) -> Result<Self> {
        self.state_columns = spec.resolve(&self.columns)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn state_columns(&self) -> &[String] {
        &self.state_columns
    }

    /// 列インデックスを取得
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.kinds[i])
    }

    /// 指定型の列名一覧（表の列順）
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .zip(&self.kinds)
            .filter(|(_, k)| **k == kind)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    /// 列の値を行順に取得
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &Cell>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// 列の重複なし値（出現順、空セルは除外）
    pub fn unique(&self, column: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for cell in self.column_values(column)? {
            if cell.is_empty() {
                continue;
            }
            let value = cell.to_string();
            if seen.insert(value.clone()) {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// 指定位置以降の列名
    pub fn columns_from(&self, index: usize) -> Vec<String> {
        self.columns.iter().skip(index).cloned().collect()
    }

    pub fn records(&self) -> impl Iterator<Item = BirdRecord<'_>> {
        (0..self.rows.len()).map(move |row| BirdRecord { table: self, row })
    }

    /// 指定行だけを持つ新しい表（列の型・州列は元の表を引き継ぐ）
    pub fn select_rows(&self, indices: &[usize]) -> BirdTable {
        BirdTable {
            columns: self.columns.clone(),
            kinds: self.kinds.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
            state_columns: self.state_columns.clone(),
        }
    }
}

/// 1行分のビュー
#[derive(Debug, Clone, Copy)]
pub struct BirdRecord<'a> {
    table: &'a BirdTable,
    row: usize,
}

impl<'a> BirdRecord<'a> {
    pub fn index(&self) -> usize {
        self.row
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let idx = self.table.columns.iter().position(|c| c == column)?;
        Some(&self.table.rows[self.row][idx])
    }

    pub fn at(&self, column_index: usize) -> &'a Cell {
        &self.table.rows[self.row][column_index]
    }
}
