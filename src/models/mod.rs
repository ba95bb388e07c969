use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Athlete as returned to clients
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Athlete {
    pub id: String,
    pub name: String,
    pub team: String,
    pub paid: bool,
}

/// One score entry for an (athlete, wod) pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoreEntry {
    pub score: String,
    pub division: String,
    pub costume: bool,
    pub bonus: f64,
}

/// Scores grouped by wod, then by athlete id
pub type ScoreBoard = BTreeMap<String, BTreeMap<String, ScoreEntry>>;

/// Full dataset returned by the getAll action
#[derive(Debug, Serialize, Deserialize)]
pub struct AllData {
    pub athletes: Vec<Athlete>,
    pub scores: ScoreBoard,
}

/// Envelope for all POST actions
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

/// Query parameters for the GET endpoint
#[derive(Debug, Deserialize)]
pub struct GetParams {
    #[serde(default)]
    pub action: Option<String>,
}

/// Payload for addAthlete. Cells are stored exactly as supplied;
/// missing fields become empty cells.
#[derive(Debug, Deserialize)]
pub struct AthleteInput {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub team: Value,
    #[serde(default)]
    pub paid: Value,
}

/// Payload for updateAthlete. Absent fields leave the stored cell untouched.
#[derive(Debug, Deserialize)]
pub struct AthleteUpdate {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub team: Option<Value>,
    #[serde(default)]
    pub paid: Option<Value>,
}

/// Payload for saveScore
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    #[serde(default)]
    pub athlete_id: Value,
    #[serde(default)]
    pub wod: Value,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub division: Value,
    #[serde(default)]
    pub costume: Value,
    #[serde(default)]
    pub bonus: Value,
}

/// Raw score cells inside a saveAllData payload
#[derive(Debug, Deserialize)]
pub struct ScoreCells {
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub division: Value,
    #[serde(default)]
    pub costume: Value,
    #[serde(default)]
    pub bonus: Value,
}

/// Payload for saveAllData
#[derive(Debug, Deserialize)]
pub struct BulkData {
    #[serde(default)]
    pub athletes: Vec<AthleteInput>,
    #[serde(default)]
    pub scores: BTreeMap<String, BTreeMap<String, ScoreCells>>,
}

/// Acknowledgement body for all mutations
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Ack { success: true }
    }
}

/// Soft error body for unrecognized actions
#[derive(Debug, Serialize)]
pub struct ActionError {
    pub error: String,
}

impl ActionError {
    pub fn unknown() -> Self {
        ActionError {
            error: "Unknown action".to_string(),
        }
    }
}

/// Athlete row as stored, one JSON-encoded cell per column
#[derive(Debug, sqlx::FromRow)]
pub struct AthleteRow {
    pub row_id: i64,
    pub id: String,
    pub name: String,
    pub team: String,
    pub paid: String,
}

impl AthleteRow {
    pub fn id_cell(&self) -> Value {
        decode_cell(&self.id)
    }

    /// Convert the stored row to the client-facing shape
    pub fn to_athlete(&self) -> Athlete {
        Athlete {
            id: cell_to_string(&decode_cell(&self.id)),
            name: cell_to_string(&decode_cell(&self.name)),
            team: cell_to_string(&decode_cell(&self.team)),
            paid: cell_to_bool(&decode_cell(&self.paid)),
        }
    }
}

/// Score row as stored
#[derive(Debug, sqlx::FromRow)]
pub struct ScoreRow {
    pub row_id: i64,
    pub athlete_id: String,
    pub wod: String,
    pub score: String,
    pub division: String,
    pub costume: String,
    pub bonus: String,
}

impl ScoreRow {
    pub fn athlete_id_cell(&self) -> Value {
        decode_cell(&self.athlete_id)
    }

    pub fn wod_cell(&self) -> Value {
        decode_cell(&self.wod)
    }

    /// Convert the stored row to the client-facing shape, applying the
    /// read-side defaults: blank division reads as "rx", unparseable
    /// bonus reads as 0.
    pub fn to_entry(&self) -> ScoreEntry {
        let division = decode_cell(&self.division);
        ScoreEntry {
            score: cell_to_string(&decode_cell(&self.score)),
            division: if cell_is_blank(&division) {
                "rx".to_string()
            } else {
                cell_to_string(&division)
            },
            costume: cell_to_bool(&decode_cell(&self.costume)),
            bonus: cell_to_number(&decode_cell(&self.bonus)),
        }
    }
}

/// Encode a request-supplied value for cell storage.
pub fn encode_cell(value: &Value) -> String {
    value.to_string()
}

/// Decode a stored cell back into the value that was written.
/// Unparseable text reads as a plain string cell.
pub fn decode_cell(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Spreadsheet-style blankness: null, empty string, false and zero all
/// count as an empty cell.
pub fn cell_is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Render a cell the way a spreadsheet displays it: empty cells as "",
/// everything else as its display text.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A flag cell is set only for boolean true or the literal string "TRUE".
pub fn cell_to_bool(value: &Value) -> bool {
    matches!(value, Value::Bool(true)) || matches!(value, Value::String(s) if s == "TRUE")
}

/// Numeric coercion with a zero fallback for anything unparseable
pub fn cell_to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_cells_accept_true_and_literal_true_string() {
        assert!(cell_to_bool(&json!(true)));
        assert!(cell_to_bool(&json!("TRUE")));
        assert!(!cell_to_bool(&json!("true")));
        assert!(!cell_to_bool(&json!("yes")));
        assert!(!cell_to_bool(&json!(1)));
        assert!(!cell_to_bool(&Value::Null));
    }

    #[test]
    fn number_cells_fall_back_to_zero() {
        assert_eq!(cell_to_number(&json!(3)), 3.0);
        assert_eq!(cell_to_number(&json!("2.5")), 2.5);
        assert_eq!(cell_to_number(&json!(" 10 ")), 10.0);
        assert_eq!(cell_to_number(&json!("12:34")), 0.0);
        assert_eq!(cell_to_number(&json!("")), 0.0);
        assert_eq!(cell_to_number(&Value::Null), 0.0);
    }

    #[test]
    fn blank_cells_follow_spreadsheet_falsiness() {
        assert!(cell_is_blank(&Value::Null));
        assert!(cell_is_blank(&json!("")));
        assert!(cell_is_blank(&json!(false)));
        assert!(cell_is_blank(&json!(0)));
        assert!(!cell_is_blank(&json!("0")));
        assert!(!cell_is_blank(&json!("rx")));
    }

    #[test]
    fn cells_round_trip_through_storage_encoding() {
        for value in [json!(true), json!("TRUE"), json!("7"), json!(7), json!(0.5)] {
            assert_eq!(decode_cell(&encode_cell(&value)), value);
        }
    }

    #[test]
    fn unparseable_stored_text_reads_as_string() {
        assert_eq!(decode_cell("not json"), json!("not json"));
    }

    #[test]
    fn score_row_applies_read_side_defaults() {
        let row = ScoreRow {
            row_id: 1,
            athlete_id: encode_cell(&json!("7")),
            wod: encode_cell(&json!("wod1")),
            score: encode_cell(&Value::Null),
            division: encode_cell(&json!("")),
            costume: encode_cell(&Value::Null),
            bonus: encode_cell(&json!("n/a")),
        };
        let entry = row.to_entry();
        assert_eq!(entry.score, "");
        assert_eq!(entry.division, "rx");
        assert!(!entry.costume);
        assert_eq!(entry.bonus, 0.0);
    }
}
