//! Film work entity kind
//!
//! The widest denormalization of the three: a film row joins its genres and
//! the three person roles, carrying both flat name arrays (for plain
//! full-text search) and nested `{uuid, name}` sub-objects (for faceted
//! queries). A film counts as changed when the film itself, one of its
//! genres or one of its credited persons was modified.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::kind::{decode_json_list, decode_text_array, EntityKind};
use crate::search::indices;

/// Genre sub-object (`{"id", "name"}` from SQL, `{"uuid", "name"}` in the
/// document)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRef {
    #[serde(rename(serialize = "uuid"))]
    pub id: Uuid,
    pub name: String,
}

/// Person sub-object, renamed to the index's `{uuid, full_name}` shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    #[serde(rename(serialize = "uuid"))]
    pub id: Uuid,
    #[serde(rename(serialize = "full_name"))]
    pub name: String,
}

/// Denormalized film work row
#[derive(Debug, Clone, Serialize)]
pub struct MovieRow {
    #[serde(rename = "uuid")]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub imdb_rating: Option<f64>,
    pub age_rating: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub access_type: Option<String>,

    pub genres_names: Vec<String>,
    pub actors_names: Vec<String>,
    pub writers_names: Vec<String>,
    pub directors_names: Vec<String>,

    pub genre: Vec<GenreRef>,
    pub actors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
    pub directors: Vec<PersonRef>,
}

impl FromRow<'_, PgRow> for MovieRow {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            imdb_rating: row.try_get("imdb_rating")?,
            age_rating: row.try_get("age_rating")?,
            release_date: row.try_get("release_date")?,
            access_type: row.try_get("access_type")?,
            genres_names: decode_text_array(row, "genres_names")?,
            actors_names: decode_text_array(row, "actors_names")?,
            writers_names: decode_text_array(row, "writers_names")?,
            directors_names: decode_text_array(row, "directors_names")?,
            genre: decode_json_list(row, "genre")?,
            actors: decode_json_list(row, "actors")?,
            writers: decode_json_list(row, "writers")?,
            directors: decode_json_list(row, "directors")?,
        })
    }
}

/// Film work kind marker
pub struct Filmwork;

impl EntityKind for Filmwork {
    type Row = MovieRow;

    const KIND: &'static str = "filmwork";
    const INDEX: &'static str = "movies";

    const CHANGED_IDS_SQL: &'static str = r#"
        SELECT DISTINCT fw.id
        FROM content.film_work AS fw
        LEFT OUTER JOIN content.genre_film_work gfw ON fw.id = gfw.film_work_id
        LEFT OUTER JOIN content.genre g ON g.id = gfw.genre_id
        LEFT OUTER JOIN content.person_film_work pfw ON fw.id = pfw.film_work_id
        LEFT OUTER JOIN content.person p ON p.id = pfw.person_id
        WHERE (fw.modified > $1 OR g.modified > $1 OR p.modified > $1)
          AND NOT (fw.id = ANY($2))
    "#;

    const ROWS_SQL: &'static str = r#"
        SELECT
            fw.id, fw.title, fw.rating AS imdb_rating, fw.description,
            fw.age_rating, fw.release_date, fw.access_type,
            array_agg(DISTINCT g.name)
                FILTER (WHERE g.id IS NOT NULL) AS genres_names,
            array_agg(DISTINCT p.full_name)
                FILTER (WHERE pfw.role = 'director') AS directors_names,
            array_agg(DISTINCT p.full_name)
                FILTER (WHERE pfw.role = 'actor') AS actors_names,
            array_agg(DISTINCT p.full_name)
                FILTER (WHERE pfw.role = 'writer') AS writers_names,
            json_agg(DISTINCT jsonb_build_object('id', g.id, 'name', g.name))
                FILTER (WHERE g.id IS NOT NULL) AS genre,
            json_agg(DISTINCT jsonb_build_object('id', p.id, 'name', p.full_name))
                FILTER (WHERE pfw.role = 'actor') AS actors,
            json_agg(DISTINCT jsonb_build_object('id', p.id, 'name', p.full_name))
                FILTER (WHERE pfw.role = 'writer') AS writers,
            json_agg(DISTINCT jsonb_build_object('id', p.id, 'name', p.full_name))
                FILTER (WHERE pfw.role = 'director') AS directors
        FROM content.film_work AS fw
        LEFT OUTER JOIN content.genre_film_work gfw ON fw.id = gfw.film_work_id
        LEFT OUTER JOIN content.genre g ON g.id = gfw.genre_id
        LEFT OUTER JOIN content.person_film_work pfw ON fw.id = pfw.film_work_id
        LEFT OUTER JOIN content.person p ON p.id = pfw.person_id
        WHERE fw.id = ANY($1)
        GROUP BY fw.id
    "#;

    fn index_definition() -> serde_json::Value {
        indices::movies_index()
    }

    fn document_id(row: &Self::Row) -> Uuid {
        row.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> MovieRow {
        MovieRow {
            id: "11111111-1111-1111-1111-111111111111".parse().unwrap(),
            title: "The Test".to_string(),
            description: Some("A film about tests".to_string()),
            imdb_rating: Some(8.2),
            age_rating: Some("18+".to_string()),
            release_date: NaiveDate::from_ymd_opt(2020, 5, 1),
            access_type: Some("public".to_string()),
            genres_names: vec!["Drama".to_string()],
            actors_names: vec!["Ann Actor".to_string()],
            writers_names: vec![],
            directors_names: vec!["Dir Ector".to_string()],
            genre: vec![GenreRef {
                id: "22222222-2222-2222-2222-222222222222".parse().unwrap(),
                name: "Drama".to_string(),
            }],
            actors: vec![PersonRef {
                id: "33333333-3333-3333-3333-333333333333".parse().unwrap(),
                name: "Ann Actor".to_string(),
            }],
            writers: vec![],
            directors: vec![PersonRef {
                id: "44444444-4444-4444-4444-444444444444".parse().unwrap(),
                name: "Dir Ector".to_string(),
            }],
        }
    }

    #[test]
    fn test_document_uses_index_field_names() {
        let doc = serde_json::to_value(sample_row()).unwrap();

        assert_eq!(doc["uuid"], "11111111-1111-1111-1111-111111111111");
        assert!(doc.get("id").is_none());
        assert_eq!(doc["release_date"], "2020-05-01");
        assert_eq!(
            doc["actors"][0],
            json!({
                "uuid": "33333333-3333-3333-3333-333333333333",
                "full_name": "Ann Actor"
            })
        );
        assert_eq!(
            doc["genre"][0],
            json!({
                "uuid": "22222222-2222-2222-2222-222222222222",
                "name": "Drama"
            })
        );
    }

    #[test]
    fn test_nested_lists_match_flat_name_arrays() {
        let doc = serde_json::to_value(sample_row()).unwrap();

        let nested_actor_names: Vec<&str> = doc["actors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["full_name"].as_str().unwrap())
            .collect();
        assert_eq!(doc["actors_names"], json!(nested_actor_names));

        assert_eq!(doc["writers"], json!([]));
        assert_eq!(doc["writers_names"], json!([]));

        let nested_director_names: Vec<&str> = doc["directors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["full_name"].as_str().unwrap())
            .collect();
        assert_eq!(doc["directors_names"], json!(nested_director_names));
    }

    #[test]
    fn test_person_ref_decodes_relational_names() {
        let person: PersonRef = serde_json::from_value(json!({
            "id": "33333333-3333-3333-3333-333333333333",
            "name": "Ann Actor"
        }))
        .unwrap();
        assert_eq!(person.name, "Ann Actor");
    }

    #[test]
    fn test_changed_ids_sql_joins_dependents() {
        assert!(Filmwork::CHANGED_IDS_SQL.contains("g.modified > $1"));
        assert!(Filmwork::CHANGED_IDS_SQL.contains("p.modified > $1"));
        assert!(Filmwork::CHANGED_IDS_SQL.contains("NOT (fw.id = ANY($2))"));
    }
}
