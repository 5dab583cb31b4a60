//! Row-to-document transformation

use super::kind::EntityKind;
use crate::error::Result;
use crate::search::WriteAction;

/// Reshape one batch of denormalized rows into write actions
///
/// Pure: one row becomes exactly one action, order preserved, no I/O. The
/// document body is the row's serialized form under the index's field
/// names; the document id is the entity uuid.
pub fn transform<K: EntityKind>(rows: Vec<K::Row>) -> Result<Vec<WriteAction>> {
    rows.into_iter()
        .map(|row| {
            Ok(WriteAction {
                index: K::INDEX,
                id: K::document_id(&row).to_string(),
                body: serde_json::to_value(&row)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::genre::{Genre, GenreRow};

    fn genre_row(id: &str, name: &str) -> GenreRow {
        GenreRow {
            id: id.parse().unwrap(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_one_row_one_action_in_order() {
        let rows = vec![
            genre_row("aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa", "Drama"),
            genre_row("bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb", "Comedy"),
        ];

        let actions = transform::<Genre>(rows).unwrap();

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].index, "genre");
        assert_eq!(actions[0].id, "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa");
        assert_eq!(actions[1].id, "bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb");
        assert_eq!(actions[1].body["name"], "Comedy");
    }

    #[test]
    fn test_updated_genre_scenario() {
        // A genre updated after the watermark must come out as an upsert
        // of {uuid, name} addressed to the genre index by its id.
        let rows = vec![genre_row("cccccccc-cccc-cccc-cccc-cccccccccccc", "Drama")];

        let actions = transform::<Genre>(rows).unwrap();

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].index, "genre");
        assert_eq!(actions[0].id, "cccccccc-cccc-cccc-cccc-cccccccccccc");
        assert_eq!(
            actions[0].body,
            serde_json::json!({
                "uuid": "cccccccc-cccc-cccc-cccc-cccccccccccc",
                "name": "Drama"
            })
        );
    }

    #[test]
    fn test_empty_batch_is_empty() {
        let actions = transform::<Genre>(Vec::new()).unwrap();
        assert!(actions.is_empty());
    }
}
