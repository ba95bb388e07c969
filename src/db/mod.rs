use serde_json::Value;
use sqlx::sqlite::SqlitePool;
use std::collections::BTreeMap;
use crate::models::*;

/// The three wod buckets every getAll response carries, and the only
/// buckets saveAllData writes.
const KNOWN_WODS: [&str; 3] = ["wod1", "wod2", "wod3"];

/// Create both backing tables if they are missing. Safe to call on every
/// request.
pub async fn init_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS athletes (
               row_id INTEGER PRIMARY KEY AUTOINCREMENT,
               id TEXT NOT NULL,
               name TEXT NOT NULL,
               team TEXT NOT NULL,
               paid TEXT NOT NULL
           )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS scores (
               row_id INTEGER PRIMARY KEY AUTOINCREMENT,
               athlete_id TEXT NOT NULL,
               wod TEXT NOT NULL,
               score TEXT NOT NULL,
               division TEXT NOT NULL,
               costume TEXT NOT NULL,
               bonus TEXT NOT NULL
           )"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Read the full dataset: every athlete row plus all scores grouped by
/// wod, then athlete id. Rows with a blank id (athletes) or a blank
/// athleteId/wod (scores) are skipped.
pub async fn get_all_data(pool: &SqlitePool) -> Result<AllData, sqlx::Error> {
    let athlete_rows = sqlx::query_as::<_, AthleteRow>(
        r#"SELECT row_id, id, name, team, paid FROM athletes ORDER BY row_id"#,
    )
    .fetch_all(pool)
    .await?;

    let athletes: Vec<Athlete> = athlete_rows
        .iter()
        .filter(|row| !cell_is_blank(&row.id_cell()))
        .map(|row| row.to_athlete())
        .collect();

    let score_rows = sqlx::query_as::<_, ScoreRow>(
        r#"SELECT row_id, athlete_id, wod, score, division, costume, bonus
           FROM scores ORDER BY row_id"#,
    )
    .fetch_all(pool)
    .await?;

    let mut scores: ScoreBoard = BTreeMap::new();
    for wod in KNOWN_WODS {
        scores.insert(wod.to_string(), BTreeMap::new());
    }
    for row in &score_rows {
        let athlete_id = cell_to_string(&row.athlete_id_cell());
        let wod_cell = row.wod_cell();
        if athlete_id.is_empty() || cell_is_blank(&wod_cell) {
            continue;
        }
        scores
            .entry(cell_to_string(&wod_cell))
            .or_default()
            .insert(athlete_id, row.to_entry());
    }

    Ok(AllData { athletes, scores })
}

/// Append one athlete row. Duplicate ids are allowed; no field validation.
pub async fn add_athlete(pool: &SqlitePool, data: &AthleteInput) -> Result<(), sqlx::Error> {
    sqlx::query(r#"INSERT INTO athletes (id, name, team, paid) VALUES (?, ?, ?, ?)"#)
        .bind(encode_cell(&data.id))
        .bind(encode_cell(&data.name))
        .bind(encode_cell(&data.team))
        .bind(encode_cell(&data.paid))
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete every athlete row matching the id (there may be duplicates),
/// then every score row belonging to that athlete. Ids compare by their
/// string rendering.
pub async fn remove_athlete(pool: &SqlitePool, id: &Value) -> Result<(), sqlx::Error> {
    let needle = cell_to_string(id);

    let athlete_rows = sqlx::query_as::<_, (i64, String)>(
        r#"SELECT row_id, id FROM athletes ORDER BY row_id"#,
    )
    .fetch_all(pool)
    .await?;

    for (row_id, id_cell) in &athlete_rows {
        if cell_to_string(&decode_cell(id_cell)) == needle {
            sqlx::query(r#"DELETE FROM athletes WHERE row_id = ?"#)
                .bind(*row_id)
                .execute(pool)
                .await?;
        }
    }

    let score_rows = sqlx::query_as::<_, (i64, String)>(
        r#"SELECT row_id, athlete_id FROM scores ORDER BY row_id"#,
    )
    .fetch_all(pool)
    .await?;

    for (row_id, athlete_id_cell) in &score_rows {
        if cell_to_string(&decode_cell(athlete_id_cell)) == needle {
            sqlx::query(r#"DELETE FROM scores WHERE row_id = ?"#)
                .bind(*row_id)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

/// Overwrite the supplied cells of the first athlete row whose id matches.
/// Later duplicates are left alone; no match means no mutation.
pub async fn update_athlete(pool: &SqlitePool, data: &AthleteUpdate) -> Result<(), sqlx::Error> {
    let needle = cell_to_string(&data.id);

    let rows = sqlx::query_as::<_, (i64, String)>(
        r#"SELECT row_id, id FROM athletes ORDER BY row_id"#,
    )
    .fetch_all(pool)
    .await?;

    let Some(row_id) = rows
        .iter()
        .find(|(_, id_cell)| cell_to_string(&decode_cell(id_cell)) == needle)
        .map(|(row_id, _)| *row_id)
    else {
        return Ok(());
    };

    if let Some(team) = &data.team {
        sqlx::query(r#"UPDATE athletes SET team = ? WHERE row_id = ?"#)
            .bind(encode_cell(team))
            .bind(row_id)
            .execute(pool)
            .await?;
    }
    if let Some(paid) = &data.paid {
        sqlx::query(r#"UPDATE athletes SET paid = ? WHERE row_id = ?"#)
            .bind(encode_cell(paid))
            .bind(row_id)
            .execute(pool)
            .await?;
    }
    if let Some(name) = &data.name {
        sqlx::query(r#"UPDATE athletes SET name = ? WHERE row_id = ?"#)
            .bind(encode_cell(name))
            .bind(row_id)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Upsert one score entry keyed by (athleteId, wod). The athleteId
/// compares by string rendering, the wod by exact cell value. The first
/// matching row is overwritten in place; otherwise a new row is appended.
pub async fn save_score(pool: &SqlitePool, data: &ScoreInput) -> Result<(), sqlx::Error> {
    let needle = cell_to_string(&data.athlete_id);

    let rows = sqlx::query_as::<_, (i64, String, String)>(
        r#"SELECT row_id, athlete_id, wod FROM scores ORDER BY row_id"#,
    )
    .fetch_all(pool)
    .await?;

    let existing = rows
        .iter()
        .find(|(_, athlete_id_cell, wod_cell)| {
            cell_to_string(&decode_cell(athlete_id_cell)) == needle
                && decode_cell(wod_cell) == data.wod
        })
        .map(|(row_id, _, _)| *row_id);

    match existing {
        Some(row_id) => {
            sqlx::query(
                r#"UPDATE scores SET score = ?, division = ?, costume = ?, bonus = ?
                   WHERE row_id = ?"#,
            )
            .bind(encode_cell(&data.score))
            .bind(encode_cell(&data.division))
            .bind(encode_cell(&data.costume))
            .bind(encode_cell(&data.bonus))
            .bind(row_id)
            .execute(pool)
            .await?;
        }
        None => {
            sqlx::query(
                r#"INSERT INTO scores (athlete_id, wod, score, division, costume, bonus)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(encode_cell(&data.athlete_id))
            .bind(encode_cell(&data.wod))
            .bind(encode_cell(&data.score))
            .bind(encode_cell(&data.division))
            .bind(encode_cell(&data.costume))
            .bind(encode_cell(&data.bonus))
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

/// Destructively replace both tables with the supplied dataset. Athletes
/// rewrite in array order with cells verbatim. Scores rewrite from the
/// wod1/wod2/wod3 buckets only; any other bucket in the input is dropped.
/// Blank score cells get write-side defaults: "" / "rx" / false / 0.
pub async fn save_all_data(pool: &SqlitePool, data: &BulkData) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM athletes"#).execute(pool).await?;
    for athlete in &data.athletes {
        add_athlete(pool, athlete).await?;
    }

    sqlx::query(r#"DELETE FROM scores"#).execute(pool).await?;
    for wod in KNOWN_WODS {
        let Some(bucket) = data.scores.get(wod) else {
            continue;
        };
        for (athlete_id, cells) in bucket {
            let score = or_blank_default(&cells.score, Value::String(String::new()));
            let division = or_blank_default(&cells.division, Value::String("rx".to_string()));
            let costume = or_blank_default(&cells.costume, Value::Bool(false));
            let bonus = or_blank_default(&cells.bonus, Value::from(0));

            sqlx::query(
                r#"INSERT INTO scores (athlete_id, wod, score, division, costume, bonus)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(encode_cell(&Value::String(athlete_id.clone())))
            .bind(encode_cell(&Value::String(wod.to_string())))
            .bind(encode_cell(&score))
            .bind(encode_cell(&division))
            .bind(encode_cell(&costume))
            .bind(encode_cell(&bonus))
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

fn or_blank_default(value: &Value, default: Value) -> Value {
    if cell_is_blank(value) {
        default
    } else {
        value.clone()
    }
}
