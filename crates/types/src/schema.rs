//! Typed column schema
//!
//! Every column of the joined actor table has a declared role. Numeric and
//! text handling is driven by these enums, never by matching on column names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical columns of the bid log that are aggregated per actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    Auction,
    Merchandise,
    Device,
    Country,
    Ip,
    Url,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 6] = [
        CategoricalColumn::Auction,
        CategoricalColumn::Merchandise,
        CategoricalColumn::Device,
        CategoricalColumn::Country,
        CategoricalColumn::Ip,
        CategoricalColumn::Url,
    ];

    /// Column name, also used as the token tag
    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Auction => "auction",
            CategoricalColumn::Merchandise => "merchandise",
            CategoricalColumn::Device => "device",
            CategoricalColumn::Country => "country",
            CategoricalColumn::Ip => "ip",
            CategoricalColumn::Url => "url",
        }
    }

    /// Tag a raw value so tokens from different columns never collide
    pub fn token(self, value: &str) -> String {
        format!("{}_{}", self.name(), value)
    }
}

/// Statistics computed over an actor's inter-bid time gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiffStatistic {
    Min,
    Max,
    Mean,
    Median,
    Range,
    /// Percentile in whole percent (10, 20, ... 90, excluding the median)
    Percentile(u8),
}

impl DiffStatistic {
    /// Decile cut points reported alongside the median
    pub const DECILES: [u8; 8] = [10, 20, 30, 40, 60, 70, 80, 90];

    /// All statistics in output column order
    pub fn all() -> Vec<DiffStatistic> {
        let mut stats = vec![
            DiffStatistic::Min,
            DiffStatistic::Max,
            DiffStatistic::Mean,
            DiffStatistic::Median,
            DiffStatistic::Range,
        ];
        stats.extend(Self::DECILES.iter().map(|&p| DiffStatistic::Percentile(p)));
        stats
    }

    pub fn name(self) -> String {
        match self {
            DiffStatistic::Min => "time_diff_min".to_string(),
            DiffStatistic::Max => "time_diff_max".to_string(),
            DiffStatistic::Mean => "time_diff_mean".to_string(),
            DiffStatistic::Median => "time_diff_median".to_string(),
            DiffStatistic::Range => "time_diff_range".to_string(),
            DiffStatistic::Percentile(p) => format!("time_diff_p{}", p),
        }
    }
}

/// Numeric columns of the joined actor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumericColumn {
    BidCount,
    Unique(CategoricalColumn),
    Diff(DiffStatistic),
}

impl NumericColumn {
    /// All numeric columns in matrix order
    pub fn all() -> Vec<NumericColumn> {
        let mut columns = vec![NumericColumn::BidCount];
        columns.extend(CategoricalColumn::ALL.iter().map(|&c| NumericColumn::Unique(c)));
        columns.extend(DiffStatistic::all().into_iter().map(NumericColumn::Diff));
        columns
    }

    pub fn name(self) -> String {
        match self {
            NumericColumn::BidCount => "bid_count".to_string(),
            NumericColumn::Unique(column) => format!("n_unique_{}", column.name()),
            NumericColumn::Diff(stat) => stat.name(),
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Text (fingerprint) columns of the joined actor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColumn {
    PaymentAccount,
    Address,
    Category(CategoricalColumn),
    TimeDiff,
}

impl TextColumn {
    /// All text columns in declaration order
    pub fn all() -> Vec<TextColumn> {
        let mut columns = vec![TextColumn::PaymentAccount, TextColumn::Address];
        columns.extend(CategoricalColumn::ALL.iter().map(|&c| TextColumn::Category(c)));
        columns.push(TextColumn::TimeDiff);
        columns
    }

    /// True for columns copied from the roster rather than aggregated from bids
    pub fn from_roster(self) -> bool {
        matches!(self, TextColumn::PaymentAccount | TextColumn::Address)
    }

    pub fn name(self) -> &'static str {
        match self {
            TextColumn::PaymentAccount => "payment_account",
            TextColumn::Address => "address",
            TextColumn::Category(column) => column.name(),
            TextColumn::TimeDiff => "time_diff",
        }
    }
}

impl fmt::Display for TextColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a text column is split into tokens before n-gram construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// Split on whitespace only; punctuation stays inside tokens
    Whitespace,
    /// Lowercased runs of two or more word characters
    Default,
}

/// Vectorizer settings for one text column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextColumnConfig {
    pub column: TextColumn,
    pub included: bool,
    /// Minimum number of documents a term must appear in
    pub min_frequency: usize,
    /// Inclusive n-gram span
    pub ngram_range: (usize, usize),
    pub tokenizer: TokenizerMode,
}

impl TextColumnConfig {
    pub fn new(
        column: TextColumn,
        min_frequency: usize,
        ngram_range: (usize, usize),
        tokenizer: TokenizerMode,
    ) -> Self {
        Self {
            column,
            included: true,
            min_frequency,
            ngram_range,
            tokenizer,
        }
    }

    pub fn excluded(column: TextColumn) -> Self {
        Self {
            column,
            included: false,
            min_frequency: 1,
            ngram_range: (1, 1),
            tokenizer: TokenizerMode::Whitespace,
        }
    }

    /// Default per-column table
    pub fn defaults() -> Vec<TextColumnConfig> {
        use CategoricalColumn as C;
        use TokenizerMode::{Default as Word, Whitespace};

        vec![
            TextColumnConfig::excluded(TextColumn::PaymentAccount),
            TextColumnConfig::excluded(TextColumn::Address),
            TextColumnConfig::new(TextColumn::Category(C::Auction), 2, (1, 1), Word),
            TextColumnConfig::new(TextColumn::Category(C::Merchandise), 1, (1, 1), Word),
            TextColumnConfig::new(TextColumn::Category(C::Device), 2, (1, 2), Word),
            TextColumnConfig::new(TextColumn::Category(C::Country), 2, (1, 2), Word),
            TextColumnConfig::new(TextColumn::Category(C::Ip), 2, (1, 1), Whitespace),
            TextColumnConfig::new(TextColumn::Category(C::Url), 2, (1, 1), Whitespace),
            TextColumnConfig::new(TextColumn::TimeDiff, 2, (1, 1), Whitespace),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_column_layout() {
        let columns = NumericColumn::all();
        assert_eq!(columns.len(), 1 + 6 + 13);
        assert_eq!(columns[0].name(), "bid_count");
        assert_eq!(columns[1].name(), "n_unique_auction");
        assert_eq!(columns.last().map(|c| c.name()), Some("time_diff_p90".to_string()));
    }

    #[test]
    fn test_token_tagging() {
        assert_eq!(CategoricalColumn::Ip.token("1.2.3.4"), "ip_1.2.3.4");
    }

    #[test]
    fn test_default_table_covers_every_text_column() {
        let table = TextColumnConfig::defaults();
        let declared: Vec<TextColumn> = table.iter().map(|c| c.column).collect();
        assert_eq!(declared, TextColumn::all());
        assert!(table
            .iter()
            .filter(|c| c.column.from_roster())
            .all(|c| !c.included));
    }
}
