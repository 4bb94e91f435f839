use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::CorpusError;

/// Column headers of the season statistics table, in source order.
pub const COLUMNS: [&str; 16] = [
    "Player",
    "IPl_team",
    "year",
    "Role",
    "Matches",
    "Innings",
    "Not_out",
    "Runs",
    "Highest_Score",
    "Average",
    "Balls_faced",
    "Strike_rate",
    "4's",
    "6's",
    "Centuries",
    "Half_centuaries",
];

/// One untyped row of the statistics table.
///
/// Every column is optional so that a short or sparse row still deserializes;
/// [`PlayerRecord::try_from`] decides what is actually required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawPlayerRow {
    #[serde(rename = "Player")]
    pub player: Option<String>,
    #[serde(rename = "IPl_team")]
    pub team: Option<String>,
    #[serde(rename = "year")]
    pub year: Option<String>,
    #[serde(rename = "Role")]
    pub role: Option<String>,
    #[serde(rename = "Matches")]
    pub matches: Option<String>,
    #[serde(rename = "Innings")]
    pub innings: Option<String>,
    #[serde(rename = "Not_out")]
    pub not_out: Option<String>,
    #[serde(rename = "Runs")]
    pub runs: Option<String>,
    #[serde(rename = "Highest_Score")]
    pub highest_score: Option<String>,
    #[serde(rename = "Average")]
    pub average: Option<String>,
    #[serde(rename = "Balls_faced")]
    pub balls_faced: Option<String>,
    #[serde(rename = "Strike_rate")]
    pub strike_rate: Option<String>,
    #[serde(rename = "4's")]
    pub fours: Option<String>,
    #[serde(rename = "6's")]
    pub sixes: Option<String>,
    #[serde(rename = "Centuries")]
    pub centuries: Option<String>,
    #[serde(rename = "Half_centuaries")]
    pub half_centuries: Option<String>,
}

impl RawPlayerRow {
    /// Set a column by its header name. Unknown headers are ignored.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let slot = match column.trim() {
            "Player" => &mut self.player,
            "IPl_team" => &mut self.team,
            "year" => &mut self.year,
            "Role" => &mut self.role,
            "Matches" => &mut self.matches,
            "Innings" => &mut self.innings,
            "Not_out" => &mut self.not_out,
            "Runs" => &mut self.runs,
            "Highest_Score" => &mut self.highest_score,
            "Average" => &mut self.average,
            "Balls_faced" => &mut self.balls_faced,
            "Strike_rate" => &mut self.strike_rate,
            "4's" => &mut self.fours,
            "6's" => &mut self.sixes,
            "Centuries" => &mut self.centuries,
            "Half_centuaries" => &mut self.half_centuries,
            _ => return,
        };
        *slot = Some(value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for RawPlayerRow
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawPlayerRow::default();
        for (column, value) in iter {
            row.set(column.as_ref(), value);
        }
        row
    }
}

/// A validated season line for one batter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player: String,
    pub team: String,
    pub year: u16,
    pub role: String,
    pub matches: u32,
    pub innings: u32,
    pub not_out: u32,
    pub runs: u32,
    /// Kept as text: not-out scores carry a trailing `*` (e.g. `"116*"`).
    pub highest_score: String,
    /// Validated decimal, kept as written in the table (`"53.90"` stays `"53.90"`).
    pub average: String,
    pub balls_faced: u32,
    pub strike_rate: String,
    pub fours: u32,
    pub sixes: u32,
    pub centuries: u32,
    pub half_centuries: u32,
}

impl PlayerRecord {
    /// Natural-language paragraph for this record.
    pub fn summary(&self) -> String {
        crate::summary::render_summary(self)
    }
}

impl TryFrom<RawPlayerRow> for PlayerRecord {
    type Error = CorpusError;

    fn try_from(row: RawPlayerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            player: text(row.player, "Player")?,
            team: text(row.team, "IPl_team")?,
            year: number(row.year, "year")?,
            role: text(row.role, "Role")?,
            matches: number(row.matches, "Matches")?,
            innings: number(row.innings, "Innings")?,
            not_out: number(row.not_out, "Not_out")?,
            runs: number(row.runs, "Runs")?,
            highest_score: text(row.highest_score, "Highest_Score")?,
            average: decimal(row.average, "Average")?,
            balls_faced: number(row.balls_faced, "Balls_faced")?,
            strike_rate: decimal(row.strike_rate, "Strike_rate")?,
            fours: number(row.fours, "4's")?,
            sixes: number(row.sixes, "6's")?,
            centuries: number(row.centuries, "Centuries")?,
            half_centuries: number(row.half_centuries, "Half_centuaries")?,
        })
    }
}

fn text(value: Option<String>, field: &'static str) -> Result<String, CorpusError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(CorpusError::MissingField { field }),
    }
}

fn number<T: FromStr>(value: Option<String>, field: &'static str) -> Result<T, CorpusError> {
    let raw = text(value, field)?;
    raw.parse::<T>().map_err(|_| CorpusError::InvalidField {
        field,
        value: raw,
        expected: "a whole number",
    })
}

fn decimal(value: Option<String>, field: &'static str) -> Result<String, CorpusError> {
    let raw = text(value, field)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(raw),
        _ => Err(CorpusError::InvalidField {
            field,
            value: raw,
            expected: "a decimal number",
        }),
    }
}
