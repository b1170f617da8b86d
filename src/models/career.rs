use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

/// Self-reported career interests, one record per student. The string lists
/// are stored as JSON array columns.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CareerDetails {
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_to_improve: Vec<String>,
    #[serde(default)]
    pub core: Vec<String>,
    #[serde(default)]
    pub it: Vec<String>,
    #[serde(default)]
    pub higher_education: Vec<String>,
    #[serde(default)]
    pub startup: Vec<String>,
    #[serde(default)]
    pub family_business: Vec<String>,
    #[serde(default)]
    pub other_interests: Vec<String>,
}

fn parse_list(raw: String) -> Vec<String> {
    serde_json::from_str(&raw).unwrap_or_default()
}

pub fn find_for_student(conn: &Connection, student_id: i64) -> rusqlite::Result<Option<CareerDetails>> {
    let mut stmt = conn.prepare(
        "SELECT hobbies, strengths, areas_to_improve, core, it, higher_education, \
                startup, family_business, other_interests \
         FROM career_details WHERE student_id = ?1",
    )?;
    let mut rows = stmt.query_map(params![student_id], |row| {
        Ok(CareerDetails {
            hobbies: parse_list(row.get(0)?),
            strengths: parse_list(row.get(1)?),
            areas_to_improve: parse_list(row.get(2)?),
            core: parse_list(row.get(3)?),
            it: parse_list(row.get(4)?),
            higher_education: parse_list(row.get(5)?),
            startup: parse_list(row.get(6)?),
            family_business: parse_list(row.get(7)?),
            other_interests: parse_list(row.get(8)?),
        })
    })?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn upsert(conn: &Connection, student_id: i64, details: &CareerDetails) -> rusqlite::Result<()> {
    let as_json = |list: &Vec<String>| serde_json::to_string(list).unwrap_or_else(|_| "[]".into());
    conn.execute(
        "INSERT INTO career_details (student_id, hobbies, strengths, areas_to_improve, \
             core, it, higher_education, startup, family_business, other_interests) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
         ON CONFLICT(student_id) DO UPDATE SET \
             hobbies = excluded.hobbies, strengths = excluded.strengths, \
             areas_to_improve = excluded.areas_to_improve, core = excluded.core, \
             it = excluded.it, higher_education = excluded.higher_education, \
             startup = excluded.startup, family_business = excluded.family_business, \
             other_interests = excluded.other_interests, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now')",
        params![
            student_id,
            as_json(&details.hobbies),
            as_json(&details.strengths),
            as_json(&details.areas_to_improve),
            as_json(&details.core),
            as_json(&details.it),
            as_json(&details.higher_education),
            as_json(&details.startup),
            as_json(&details.family_business),
            as_json(&details.other_interests),
        ],
    )?;
    Ok(())
}
