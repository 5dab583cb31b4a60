//! Fixed index definitions
//!
//! One settings+mappings body per entity kind. Text fields run through the
//! bilingual `ru_en` analyzer (lowercase, stopword removal, stemming for
//! Russian and English), identifiers are exact-match keywords, and
//! sub-object fields are `nested` so faceted queries can address them.
//! Mappings are `strict`: the document shape is owned by the transformers,
//! not by the search engine's dynamic mapping.

use serde_json::{json, Value};

/// Shared index settings: refresh interval plus the `ru_en` analyzer chain
fn base_settings() -> Value {
    json!({
        "refresh_interval": "1s",
        "analysis": {
            "filter": {
                "english_stop": {
                    "type": "stop",
                    "stopwords": "_english_"
                },
                "english_stemmer": {
                    "type": "stemmer",
                    "language": "english"
                },
                "english_possessive_stemmer": {
                    "type": "stemmer",
                    "language": "possessive_english"
                },
                "russian_stop": {
                    "type": "stop",
                    "stopwords": "_russian_"
                },
                "russian_stemmer": {
                    "type": "stemmer",
                    "language": "russian"
                }
            },
            "analyzer": {
                "ru_en": {
                    "tokenizer": "standard",
                    "filter": [
                        "lowercase",
                        "english_stop",
                        "english_stemmer",
                        "english_possessive_stemmer",
                        "russian_stop",
                        "russian_stemmer"
                    ]
                }
            }
        }
    })
}

/// Analyzed text field with an exact-match `.raw` subfield
fn text_with_raw() -> Value {
    json!({
        "type": "text",
        "analyzer": "ru_en",
        "fields": {
            "raw": {
                "type": "keyword"
            }
        }
    })
}

/// Nested `{uuid, full_name}` person reference
fn person_ref_mapping() -> Value {
    json!({
        "type": "nested",
        "dynamic": "strict",
        "properties": {
            "uuid": {
                "type": "keyword"
            },
            "full_name": {
                "type": "text",
                "analyzer": "ru_en"
            }
        }
    })
}

/// Definition of the film work index
pub fn movies_index() -> Value {
    json!({
        "settings": base_settings(),
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "uuid": {
                    "type": "keyword"
                },
                "imdb_rating": {
                    "type": "float"
                },
                "age_rating": {
                    "type": "text"
                },
                "access_type": {
                    "type": "text"
                },
                "release_date": {
                    "type": "date"
                },
                "genre": {
                    "type": "nested",
                    "dynamic": "strict",
                    "properties": {
                        "uuid": {
                            "type": "keyword"
                        },
                        "name": text_with_raw()
                    }
                },
                "title": text_with_raw(),
                "description": {
                    "type": "text",
                    "analyzer": "ru_en"
                },
                "genres_names": {
                    "type": "text",
                    "analyzer": "ru_en"
                },
                "actors_names": {
                    "type": "text",
                    "analyzer": "ru_en"
                },
                "writers_names": {
                    "type": "text",
                    "analyzer": "ru_en"
                },
                "directors_names": {
                    "type": "text",
                    "analyzer": "ru_en"
                },
                "actors": person_ref_mapping(),
                "writers": person_ref_mapping(),
                "directors": person_ref_mapping()
            }
        }
    })
}

/// Definition of the genre index
pub fn genre_index() -> Value {
    json!({
        "settings": base_settings(),
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "uuid": {
                    "type": "keyword"
                },
                "name": text_with_raw()
            }
        }
    })
}

/// Definition of the person index
pub fn person_index() -> Value {
    json!({
        "settings": base_settings(),
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "uuid": {
                    "type": "keyword"
                },
                "full_name": text_with_raw(),
                "films_ids": {
                    "type": "keyword"
                },
                "roles": {
                    "type": "nested",
                    "properties": {
                        "role": text_with_raw(),
                        "films": {
                            "type": "nested",
                            "properties": {
                                "uuid": {
                                    "type": "keyword"
                                },
                                "title": text_with_raw(),
                                "imdb_rating": {
                                    "type": "float"
                                },
                                "age_rating": {
                                    "type": "text"
                                },
                                "access_type": {
                                    "type": "text"
                                },
                                "release_date": {
                                    "type": "date"
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_index_carries_the_ru_en_analyzer() {
        for definition in [movies_index(), genre_index(), person_index()] {
            let analyzer = &definition["settings"]["analysis"]["analyzer"]["ru_en"];
            assert_eq!(analyzer["tokenizer"], "standard");
            let filters = analyzer["filter"].as_array().unwrap();
            assert!(filters.iter().any(|f| f == "russian_stemmer"));
            assert!(filters.iter().any(|f| f == "english_stemmer"));
        }
    }

    #[test]
    fn test_mappings_are_strict() {
        for definition in [movies_index(), genre_index(), person_index()] {
            assert_eq!(definition["mappings"]["dynamic"], "strict");
        }
    }

    #[test]
    fn test_movies_nested_fields() {
        let definition = movies_index();
        for field in ["genre", "actors", "writers", "directors"] {
            assert_eq!(
                definition["mappings"]["properties"][field]["type"], "nested",
                "{field} should be nested"
            );
        }
    }

    #[test]
    fn test_person_roles_hold_nested_films() {
        let definition = person_index();
        let roles = &definition["mappings"]["properties"]["roles"];
        assert_eq!(roles["type"], "nested");
        assert_eq!(roles["properties"]["films"]["type"], "nested");
        assert_eq!(
            roles["properties"]["films"]["properties"]["uuid"]["type"],
            "keyword"
        );
    }
}
