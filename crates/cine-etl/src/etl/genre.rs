//! Genre entity kind

use serde::Serialize;
use uuid::Uuid;

use super::kind::EntityKind;
use crate::search::indices;

/// Denormalized genre row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GenreRow {
    #[serde(rename = "uuid")]
    pub id: Uuid,
    pub name: String,
}

/// Genre kind marker
pub struct Genre;

impl EntityKind for Genre {
    type Row = GenreRow;

    const KIND: &'static str = "genre";
    const INDEX: &'static str = "genre";

    const CHANGED_IDS_SQL: &'static str = r#"
        SELECT g.id
        FROM content.genre AS g
        WHERE g.modified > $1
          AND NOT (g.id = ANY($2))
    "#;

    const ROWS_SQL: &'static str = r#"
        SELECT g.id, g.name
        FROM content.genre AS g
        WHERE g.id = ANY($1)
    "#;

    fn index_definition() -> serde_json::Value {
        indices::genre_index()
    }

    fn document_id(row: &Self::Row) -> Uuid {
        row.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let row = GenreRow {
            id: "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa".parse().unwrap(),
            name: "Drama".to_string(),
        };

        let doc = serde_json::to_value(row).unwrap();
        assert_eq!(
            doc,
            serde_json::json!({
                "uuid": "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa",
                "name": "Drama"
            })
        );
    }
}
