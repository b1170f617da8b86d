use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

/// Personal-problem survey, one record per student. All flags default to
/// false so a partial submission clears what it omits.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersonalProblem {
    #[serde(default)]
    pub stress: bool,
    #[serde(default)]
    pub anger: bool,
    #[serde(default)]
    pub emotional_problem: bool,
    #[serde(default)]
    pub low_self_esteem: bool,
    #[serde(default)]
    pub examination_anxiety: bool,
    #[serde(default)]
    pub negative_thoughts: bool,
    #[serde(default)]
    pub financial_problem: bool,
    #[serde(default)]
    pub mood_swings: bool,
    #[serde(default)]
    pub disturbed_relationship_parents: bool,
    #[serde(default)]
    pub disturbed_relationship_teachers: bool,
    #[serde(default)]
    pub disturbed_relationship_friends: bool,
    #[serde(default)]
    pub time_management_problem: bool,
    #[serde(default)]
    pub procrastination: bool,
    #[serde(default)]
    pub low_self_motivation: bool,
    #[serde(default)]
    pub poor_concentration: bool,
    #[serde(default)]
    pub worries_about_future: bool,
    #[serde(default)]
    pub fear_of_public_speaking: bool,
}

const FLAG_COLUMNS: [&str; 17] = [
    "stress",
    "anger",
    "emotional_problem",
    "low_self_esteem",
    "examination_anxiety",
    "negative_thoughts",
    "financial_problem",
    "mood_swings",
    "disturbed_relationship_parents",
    "disturbed_relationship_teachers",
    "disturbed_relationship_friends",
    "time_management_problem",
    "procrastination",
    "low_self_motivation",
    "poor_concentration",
    "worries_about_future",
    "fear_of_public_speaking",
];

impl PersonalProblem {
    fn flags(&self) -> [bool; 17] {
        [
            self.stress,
            self.anger,
            self.emotional_problem,
            self.low_self_esteem,
            self.examination_anxiety,
            self.negative_thoughts,
            self.financial_problem,
            self.mood_swings,
            self.disturbed_relationship_parents,
            self.disturbed_relationship_teachers,
            self.disturbed_relationship_friends,
            self.time_management_problem,
            self.procrastination,
            self.low_self_motivation,
            self.poor_concentration,
            self.worries_about_future,
            self.fear_of_public_speaking,
        ]
    }
}

pub fn find_for_student(
    conn: &Connection,
    student_id: i64,
) -> rusqlite::Result<Option<PersonalProblem>> {
    let sql = format!(
        "SELECT {} FROM personal_problems WHERE student_id = ?1",
        FLAG_COLUMNS.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![student_id], |row| {
        Ok(PersonalProblem {
            stress: row.get(0)?,
            anger: row.get(1)?,
            emotional_problem: row.get(2)?,
            low_self_esteem: row.get(3)?,
            examination_anxiety: row.get(4)?,
            negative_thoughts: row.get(5)?,
            financial_problem: row.get(6)?,
            mood_swings: row.get(7)?,
            disturbed_relationship_parents: row.get(8)?,
            disturbed_relationship_teachers: row.get(9)?,
            disturbed_relationship_friends: row.get(10)?,
            time_management_problem: row.get(11)?,
            procrastination: row.get(12)?,
            low_self_motivation: row.get(13)?,
            poor_concentration: row.get(14)?,
            worries_about_future: row.get(15)?,
            fear_of_public_speaking: row.get(16)?,
        })
    })?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn upsert(conn: &Connection, student_id: i64, survey: &PersonalProblem) -> rusqlite::Result<()> {
    let placeholders: Vec<String> = (2..=FLAG_COLUMNS.len() + 1).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = FLAG_COLUMNS
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    let sql = format!(
        "INSERT INTO personal_problems (student_id, {}) VALUES (?1, {}) \
         ON CONFLICT(student_id) DO UPDATE SET {}, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now')",
        FLAG_COLUMNS.join(", "),
        placeholders.join(", "),
        updates.join(", "),
    );
    let mut stmt = conn.prepare(&sql)?;
    let flags = survey.flags();
    let mut values: Vec<rusqlite::types::Value> = Vec::with_capacity(flags.len() + 1);
    values.push(rusqlite::types::Value::Integer(student_id));
    for flag in flags {
        values.push(rusqlite::types::Value::Integer(flag as i64));
    }
    stmt.execute(rusqlite::params_from_iter(values))?;
    Ok(())
}
