//! Typed row structures for the movie catalog.
//!
//! Each query result shape has a compile-time-checked field list; JSON field
//! names follow the public API's camelCase convention.

use serde::Serialize;
use sqlx::FromRow;

/// One row of the list/search query (and the core of the detail response).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub tconst: String,
    pub title_type: String,
    pub primary_title: String,
    pub original_title: String,
    pub is_adult: bool,
    pub start_year: Option<i16>,
    pub end_year: Option<i16>,
    pub runtime_minutes: Option<i16>,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub votes: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieList {
    pub items: Vec<Movie>,
}

/// Detail response: the primary entity plus its cast and crew lists.
/// Both lists may be empty; that is a valid state, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

/// Raw cast row; `characters` arrives as a text array of which only the
/// first entry is surfaced.
#[derive(Debug, FromRow)]
pub(crate) struct CastRow {
    pub primary_name: String,
    pub characters: Option<Vec<String>>,
    pub ordering: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub name: String,
    pub character: String,
    pub ordering: i32,
}

impl From<CastRow> for CastMember {
    fn from(row: CastRow) -> Self {
        let character = row
            .characters
            .unwrap_or_default()
            .into_iter()
            .next()
            .unwrap_or_default();
        Self {
            name: row.primary_name,
            character,
            ordering: row.ordering,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub name: String,
    pub category: String,
    pub job: String,
    pub ordering: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_member_takes_first_character() {
        let member = CastMember::from(CastRow {
            primary_name: "Setsuko Hara".to_string(),
            characters: Some(vec!["Noriko".to_string(), "Herself".to_string()]),
            ordering: 2,
        });
        assert_eq!(member.character, "Noriko");
        assert_eq!(member.name, "Setsuko Hara");
    }

    #[test]
    fn cast_member_defaults_to_empty_character() {
        let member = CastMember::from(CastRow {
            primary_name: "Chishu Ryu".to_string(),
            characters: None,
            ordering: 1,
        });
        assert_eq!(member.character, "");
    }

    #[test]
    fn movie_serializes_with_camel_case_fields() {
        let movie = Movie {
            tconst: "tt0053604".to_string(),
            title_type: "movie".to_string(),
            primary_title: "Late Autumn".to_string(),
            original_title: "Akibiyori".to_string(),
            is_adult: false,
            start_year: Some(1960),
            end_year: None,
            runtime_minutes: Some(128),
            genres: vec!["Drama".to_string()],
            rating: Some(8.1),
            votes: Some(5000),
        };
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["primaryTitle"], "Late Autumn");
        assert_eq!(json["runtimeMinutes"], 128);
        assert!(json["endYear"].is_null());
    }
}
