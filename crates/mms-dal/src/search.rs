use serde::{Deserialize, Serialize};
use sqlx::QueryBuilder;

use crate::{ChosenDB, movie::MOVIE_SELECT};

/// Sparse search request. A zero year or a missing or empty string
/// means the field does not constrain the result.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MovieSearchRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub beginyear: i32,
    #[serde(default)]
    pub endyear: i32,
    #[serde(default)]
    pub imdb: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Builds the movie listing query constrained by every populated field
/// of the request, AND-ed together. With nothing populated the query
/// lists the whole collection. When both year bounds are given a single
/// inclusive BETWEEN is emitted instead of two comparisons. The base
/// select always joins genres so each row carries the flattened genre
/// string.
pub fn filter_query(request: &MovieSearchRequest) -> QueryBuilder<'_, ChosenDB> {
    let mut builder = QueryBuilder::new(MOVIE_SELECT);
    builder.push(" WHERE 1 = 1");
    if let Some(title) = present(&request.title) {
        builder.push(" AND m.title = ").push_bind(title);
    }
    if let Some(director) = present(&request.director) {
        builder.push(" AND m.director = ").push_bind(director);
    }
    if request.beginyear != 0 && request.endyear != 0 {
        builder
            .push(" AND m.year BETWEEN ")
            .push_bind(request.beginyear)
            .push(" AND ")
            .push_bind(request.endyear);
    } else if request.beginyear != 0 {
        builder.push(" AND m.year >= ").push_bind(request.beginyear);
    } else if request.endyear != 0 {
        builder.push(" AND m.year <= ").push_bind(request.endyear);
    }
    if let Some(imdb) = present(&request.imdb) {
        builder.push(" AND m.imdb = ").push_bind(imdb);
    }
    builder.push(" GROUP BY m.id ORDER BY m.id");
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(request: &MovieSearchRequest) -> String {
        filter_query(request).sql().to_string()
    }

    #[test]
    fn empty_request_has_no_conditions() {
        let sql = sql_for(&MovieSearchRequest::default());
        assert!(!sql.contains(" AND m."));
        assert!(sql.contains("GROUP BY m.id"));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let request = MovieSearchRequest {
            title: Some(String::new()),
            director: Some(String::new()),
            imdb: Some(String::new()),
            ..Default::default()
        };
        assert!(!sql_for(&request).contains(" AND m."));
    }

    #[test]
    fn single_year_bounds_are_comparisons() {
        let request = MovieSearchRequest {
            beginyear: 2000,
            ..Default::default()
        };
        let sql = sql_for(&request);
        assert!(sql.contains("m.year >= "));
        assert!(!sql.contains("BETWEEN"));

        let request = MovieSearchRequest {
            endyear: 2010,
            ..Default::default()
        };
        let sql = sql_for(&request);
        assert!(sql.contains("m.year <= "));
        assert!(!sql.contains("BETWEEN"));
    }

    #[test]
    fn both_year_bounds_collapse_to_single_range() {
        let request = MovieSearchRequest {
            beginyear: 2000,
            endyear: 2010,
            ..Default::default()
        };
        let sql = sql_for(&request);
        assert_eq!(sql.matches("BETWEEN").count(), 1);
        assert!(!sql.contains(">="));
        assert!(!sql.contains("<="));
    }

    #[test]
    fn all_fields_are_anded() {
        let request = MovieSearchRequest {
            title: Some("Heat".to_string()),
            director: Some("Michael Mann".to_string()),
            beginyear: 1990,
            endyear: 2000,
            imdb: Some("8.3".to_string()),
        };
        let sql = sql_for(&request);
        assert!(sql.contains("m.title = "));
        assert!(sql.contains("m.director = "));
        assert!(sql.contains("m.year BETWEEN "));
        assert!(sql.contains("m.imdb = "));
    }
}
