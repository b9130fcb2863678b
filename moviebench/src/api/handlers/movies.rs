use crate::AppState;
use crate::db::handlers::movies::Movies;
use crate::db::models::movies::{MovieDetail, MovieList};
use crate::errors::Error;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

fn default_optimize() -> bool {
    true
}

// Query parameters for the list endpoints
#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    #[serde(default)]
    title: String,
    #[serde(default = "default_optimize")]
    optimize: bool,
}

// Query parameters for the detail endpoints
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    #[serde(default = "default_optimize")]
    optimize: bool,
}

// GET /movies - list movies (optional ?title= filter, ?optimize= pool choice)
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MoviesQuery>,
) -> Result<Json<MovieList>, Error> {
    let movies = Movies::new(&state.db)
        .get_all(&query.title, query.optimize)
        .await
        .map_err(|err| {
            // Deliberately coarse: any data-path failure reads as not-found.
            tracing::debug!("movie list query failed: {err}");
            Error::NotFound {
                resource: "title".to_string(),
                id: query.title.clone(),
            }
        })?;
    Ok(Json(movies))
}

// GET /movies/explain - plan text for the list query
pub async fn explain_movies(
    State(state): State<AppState>,
    Query(query): Query<MoviesQuery>,
) -> Result<String, Error> {
    let plan = Movies::new(&state.db).get_all_explain(&query.title, query.optimize).await?;
    Ok(plan)
}

// GET /movies/{tconst} - movie detail with cast and crew
pub async fn get_movie(
    State(state): State<AppState>,
    Path(tconst): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<MovieDetail>, Error> {
    let detail = Movies::new(&state.db)
        .get_by_id(&tconst, query.optimize)
        .await
        .map_err(|err| {
            tracing::debug!("movie detail query failed: {err}");
            Error::NotFound {
                resource: "title".to_string(),
                id: tconst.clone(),
            }
        })?;
    Ok(Json(detail))
}

// GET /movies/{tconst}/explain - multi-section comparison report
pub async fn explain_movie(
    State(state): State<AppState>,
    Path(tconst): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<String, Error> {
    let report = Movies::new(&state.db).get_by_id_explain(&tconst, query.optimize).await?;
    Ok(report)
}
