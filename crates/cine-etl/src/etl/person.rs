//! Person entity kind
//!
//! A person document carries the flat set of film ids they appear in plus
//! one `roles` entry per role (actor, writer, director), each with the
//! films (reduced to a summary) the person participated in under that
//! role. All three role entries are always present; a role without films
//! holds an empty list. A person counts as changed when the person row or
//! any of their films was modified.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::kind::{decode_json_list, EntityKind};
use crate::search::indices;

/// Roles a person can hold in a film's crew
pub const PERSON_ROLES: [&str; 3] = ["actor", "writer", "director"];

/// Film summary inside a person's role bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmSummary {
    #[serde(rename(serialize = "uuid"))]
    pub id: Uuid,
    pub title: String,
    pub imdb_rating: Option<f64>,
    pub age_rating: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub access_type: Option<String>,
}

/// One role with the films held under it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleFilms {
    pub role: &'static str,
    pub films: Vec<FilmSummary>,
}

/// Denormalized person row
#[derive(Debug, Clone, Serialize)]
pub struct PersonRow {
    #[serde(rename = "uuid")]
    pub id: Uuid,
    pub full_name: String,
    pub films_ids: Vec<Uuid>,
    pub roles: Vec<RoleFilms>,
}

impl FromRow<'_, PgRow> for PersonRow {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        let roles = PERSON_ROLES
            .iter()
            .map(|&role| {
                Ok(RoleFilms {
                    role,
                    films: decode_json_list(row, role)?,
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            films_ids: row
                .try_get::<Option<Vec<Uuid>>, _>("films_ids")?
                .unwrap_or_default(),
            roles,
        })
    }
}

/// Person kind marker
pub struct Person;

impl EntityKind for Person {
    type Row = PersonRow;

    const KIND: &'static str = "person";
    const INDEX: &'static str = "person";

    const CHANGED_IDS_SQL: &'static str = r#"
        SELECT DISTINCT p.id
        FROM content.person AS p
        LEFT JOIN content.person_film_work pfw ON pfw.person_id = p.id
        LEFT JOIN content.film_work fw ON pfw.film_work_id = fw.id
        WHERE (p.modified > $1 OR fw.modified > $1)
          AND NOT (p.id = ANY($2))
    "#;

    const ROWS_SQL: &'static str = r#"
        SELECT
            p.id, p.full_name,
            array_agg(DISTINCT fw.id)
                FILTER (WHERE fw.id IS NOT NULL) AS films_ids,
            json_agg(DISTINCT jsonb_build_object(
                'id', fw.id, 'title', fw.title, 'imdb_rating', fw.rating,
                'age_rating', fw.age_rating, 'release_date', fw.release_date,
                'access_type', fw.access_type
                ))
                FILTER (WHERE pfw.role = 'actor') AS actor,
            json_agg(DISTINCT jsonb_build_object(
                'id', fw.id, 'title', fw.title, 'imdb_rating', fw.rating,
                'age_rating', fw.age_rating, 'release_date', fw.release_date,
                'access_type', fw.access_type
                ))
                FILTER (WHERE pfw.role = 'writer') AS writer,
            json_agg(DISTINCT jsonb_build_object(
                'id', fw.id, 'title', fw.title, 'imdb_rating', fw.rating,
                'age_rating', fw.age_rating, 'release_date', fw.release_date,
                'access_type', fw.access_type
                ))
                FILTER (WHERE pfw.role = 'director') AS director
        FROM content.person AS p
        LEFT JOIN content.person_film_work pfw ON p.id = pfw.person_id
        LEFT OUTER JOIN content.film_work fw ON fw.id = pfw.film_work_id
        WHERE p.id = ANY($1)
        GROUP BY p.id
    "#;

    fn index_definition() -> serde_json::Value {
        indices::person_index()
    }

    fn document_id(row: &Self::Row) -> Uuid {
        row.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_buckets_films_by_role() {
        let film = FilmSummary {
            id: "55555555-5555-5555-5555-555555555555".parse().unwrap(),
            title: "The Test".to_string(),
            imdb_rating: Some(7.0),
            age_rating: None,
            release_date: NaiveDate::from_ymd_opt(2019, 3, 14),
            access_type: Some("public".to_string()),
        };

        let row = PersonRow {
            id: "66666666-6666-6666-6666-666666666666".parse().unwrap(),
            full_name: "Ann Actor".to_string(),
            films_ids: vec![film.id],
            roles: vec![
                RoleFilms {
                    role: "actor",
                    films: vec![film],
                },
                RoleFilms {
                    role: "writer",
                    films: vec![],
                },
                RoleFilms {
                    role: "director",
                    films: vec![],
                },
            ],
        };

        let doc = serde_json::to_value(row).unwrap();
        assert_eq!(doc["uuid"], "66666666-6666-6666-6666-666666666666");
        assert_eq!(doc["full_name"], "Ann Actor");
        assert_eq!(
            doc["films_ids"],
            json!(["55555555-5555-5555-5555-555555555555"])
        );

        let roles = doc["roles"].as_array().unwrap();
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0]["role"], "actor");
        assert_eq!(roles[0]["films"][0]["uuid"], "55555555-5555-5555-5555-555555555555");
        assert_eq!(roles[0]["films"][0]["title"], "The Test");
        assert_eq!(roles[1], json!({"role": "writer", "films": []}));
        assert_eq!(roles[2], json!({"role": "director", "films": []}));
    }

    #[test]
    fn test_film_summary_decodes_aggregated_json() {
        let summary: FilmSummary = serde_json::from_value(json!({
            "id": "55555555-5555-5555-5555-555555555555",
            "title": "The Test",
            "imdb_rating": null,
            "age_rating": "16+",
            "release_date": "2019-03-14",
            "access_type": "public"
        }))
        .unwrap();

        assert_eq!(summary.title, "The Test");
        assert_eq!(summary.imdb_rating, None);
        assert_eq!(summary.release_date, NaiveDate::from_ymd_opt(2019, 3, 14));
    }

    #[test]
    fn test_roles_cover_every_crew_role() {
        assert_eq!(PERSON_ROLES, ["actor", "writer", "director"]);
    }
}
