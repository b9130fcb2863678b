//! Database repository for the movie catalog.
//!
//! Every operation selects one pool up front via [`DbPools::select`] and
//! sticks with it; the optimize flag is the benchmarking axis and is never
//! overridden internally.

use crate::db::{
    errors::{DbError, Result},
    explain::{self, ExplainSection},
    models::movies::{CastMember, CastRow, CrewMember, Movie, MovieDetail, MovieList},
    pools::DbPools,
};
use tracing::instrument;

const LIST_QUERY_BASE: &str = "\
SELECT tb.tconst,
       tt.name AS title_type,
       tb.primary_title,
       tb.original_title,
       tb.is_adult,
       tb.start_year,
       tb.end_year,
       tb.runtime_minutes,
       ARRAY(
           SELECT g.name FROM title_genres tg
           JOIN genres g ON g.id = tg.genre_id
           WHERE tg.tconst = tb.tconst
       ) AS genres,
       tr.average_rating AS rating,
       tr.num_votes AS votes
FROM title_basics tb
JOIN title_type tt ON tt.id = tb.title_type_id
LEFT JOIN title_ratings tr ON tr.tconst = tb.tconst";

const LIST_QUERY_FILTER: &str = "\
WHERE tb.primary_title ILIKE '%' || $1 || '%'
   OR tb.original_title ILIKE '%' || $1 || '%'";

const LIST_QUERY_LIMIT: &str = "LIMIT 20";

const DETAIL_QUERY: &str = "\
SELECT tb.tconst,
       tt.name AS title_type,
       tb.primary_title,
       tb.original_title,
       tb.is_adult,
       tb.start_year,
       tb.end_year,
       tb.runtime_minutes,
       COALESCE(tr.average_rating, 0) AS rating,
       COALESCE(tr.num_votes, 0) AS votes,
       ARRAY(
           SELECT g.name FROM title_genres tg
           JOIN genres g ON g.id = tg.genre_id
           WHERE tg.tconst = tb.tconst
       ) AS genres
FROM title_basics tb
LEFT JOIN title_type tt ON tt.id = tb.title_type_id
LEFT JOIN title_ratings tr ON tr.tconst = tb.tconst
WHERE tb.tconst = $1";

const CAST_QUERY: &str = "\
SELECT nb.primary_name, tp.characters, tp.ordering
FROM title_principals tp
JOIN name_basics nb ON nb.nconst = tp.nconst
JOIN principal_categories pc ON pc.id = tp.category_id
WHERE tp.tconst = $1
  AND pc.name IN ('actor', 'actress', 'self')
ORDER BY tp.ordering";

const CREW_QUERY: &str = "\
SELECT nb.primary_name AS name, pc.name AS category, COALESCE(tp.job, '') AS job, tp.ordering
FROM title_principals tp
JOIN name_basics nb ON nb.nconst = tp.nconst
JOIN principal_categories pc ON pc.id = tp.category_id
WHERE tp.tconst = $1
  AND pc.name NOT IN ('actor', 'actress', 'self')
ORDER BY tp.ordering";

/// Assemble the list query. The SQL shape depends only on whether a filter
/// is present, never on its value; the value itself is always bound, so one
/// prepared-statement shape covers all filtered searches.
pub fn build_list_query(title: &str) -> (String, bool) {
    let has_filter = !title.is_empty();
    let mut query = String::from(LIST_QUERY_BASE);
    if has_filter {
        query.push('\n');
        query.push_str(LIST_QUERY_FILTER);
    }
    query.push('\n');
    query.push_str(LIST_QUERY_LIMIT);
    (query, has_filter)
}

/// Repository facade over the pool pair.
pub struct Movies<'a> {
    pools: &'a DbPools,
}

impl<'a> Movies<'a> {
    pub fn new(pools: &'a DbPools) -> Self {
        Self { pools }
    }

    /// List movies, optionally filtered by a case-insensitive substring
    /// match over the primary and original titles. Capped at 20 rows.
    #[instrument(skip(self), err)]
    pub async fn get_all(&self, title: &str, optimize: bool) -> Result<MovieList> {
        let pool = self.pools.select(optimize);
        let (query, has_filter) = build_list_query(title);

        let mut list_query = sqlx::query_as::<_, Movie>(&query);
        if has_filter {
            list_query = list_query.bind(title);
        }

        let items = list_query.fetch_all(pool).await?;
        Ok(MovieList { items })
    }

    /// EXPLAIN output for the list query, as raw plan text.
    #[instrument(skip(self), err)]
    pub async fn get_all_explain(&self, title: &str, optimize: bool) -> Result<String> {
        let pool = self.pools.select(optimize);
        let (query, has_filter) = build_list_query(title);
        let binds: &[&str] = if has_filter { &[title] } else { &[] };

        explain::run_explain(pool, &query, binds)
            .await
            .map_err(|err| DbError::explain("movie list", err))
    }

    /// Fetch one movie with its cast and crew. The primary row is required;
    /// empty cast or crew lists are valid.
    #[instrument(skip(self), err)]
    pub async fn get_by_id(&self, tconst: &str, optimize: bool) -> Result<MovieDetail> {
        let pool = self.pools.select(optimize);

        let movie = sqlx::query_as::<_, Movie>(DETAIL_QUERY)
            .bind(tconst)
            .fetch_optional(pool)
            .await?
            .ok_or(DbError::NotFound)?;

        let cast: Vec<CastMember> = sqlx::query_as::<_, CastRow>(CAST_QUERY)
            .bind(tconst)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(CastMember::from)
            .collect();

        let crew = sqlx::query_as::<_, CrewMember>(CREW_QUERY)
            .bind(tconst)
            .fetch_all(pool)
            .await?;

        Ok(MovieDetail { movie, cast, crew })
    }

    /// Three labelled EXPLAIN passes (detail, cast, crew) rendered as one
    /// report. Passes run strictly sequentially on the selected pool so the
    /// per-step timings are not confounded by connection contention. Any
    /// failing pass discards all assembled text and returns only the error.
    #[instrument(skip(self), err)]
    pub async fn get_by_id_explain(&self, tconst: &str, optimize: bool) -> Result<String> {
        let pool = self.pools.select(optimize);

        let passes: [(&'static str, &'static str, &'static str, &str); 3] = [
            (
                "main query",
                "MAIN QUERY (Movie Details)",
                "Main Query (Movie Details)",
                DETAIL_QUERY,
            ),
            ("cast query", "CAST QUERY", "Cast Query", CAST_QUERY),
            ("crew query", "CREW QUERY", "Crew Query", CREW_QUERY),
        ];

        let mut sections = Vec::with_capacity(passes.len());
        for (pass, label, summary_label, query) in passes {
            let plan = explain::run_explain(pool, query, &[tconst])
                .await
                .map_err(|err| DbError::explain(pass, err))?;
            sections.push(ExplainSection::new(label, summary_label, plan));
        }

        Ok(explain::render_report(&sections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_query_has_no_where_clause() {
        let (query, has_filter) = build_list_query("");
        assert!(!has_filter);
        assert!(!query.contains("ILIKE"));
        assert!(query.ends_with("LIMIT 20"));
    }

    #[test]
    fn filtered_query_appends_only_the_filter_fragment() {
        let (unfiltered, _) = build_list_query("");
        let (filtered, has_filter) = build_list_query("tokyo");
        assert!(has_filter);
        assert!(filtered.contains("ILIKE"));
        assert!(filtered.ends_with("LIMIT 20"));

        // The two shapes differ exactly by the filter fragment.
        let without_fragment = filtered.replace(&format!("\n{LIST_QUERY_FILTER}"), "");
        assert_eq!(without_fragment, unfiltered);
    }

    #[test]
    fn query_shape_is_independent_of_filter_value() {
        assert_eq!(build_list_query("ozu").0, build_list_query("kurosawa").0);
    }

    #[test]
    fn filter_value_is_never_interpolated() {
        let (query, _) = build_list_query("'; DROP TABLE title_basics; --");
        assert!(!query.contains("DROP TABLE"));
        assert!(query.contains("$1"));
    }
}
