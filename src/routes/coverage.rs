use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::config::SearchSettings;
use crate::core::{Catalog, QueryError, RadiusSearch, Session};
use crate::models::{
    CatalogStatsResponse, CitiesQuery, CitiesResponse, ErrorResponse, ExclusionsRequest,
    HealthResponse, SearchRequest, SearchResponse, SearchResult, SelectionResponse,
    SessionResponse,
};
use crate::services::{SessionError, SessionStore};
use std::sync::Arc;
use uuid::Uuid;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub resolver: RadiusSearch,
    pub sessions: SessionStore,
    pub search: SearchSettings,
}

/// Configure all coverage-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/catalog/stats", web::get().to(catalog_stats))
        .route("/cities", web::get().to(list_cities))
        .route("/search", web::post().to(search))
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{id}", web::get().to(get_session))
        .route("/sessions/{id}", web::delete().to(delete_session))
        .route("/sessions/{id}/search", web::post().to(session_search))
        .route("/sessions/{id}/selection", web::get().to(get_selection))
        .route("/sessions/{id}/exclusions", web::put().to(replace_exclusions))
        .route("/sessions/{id}/exclusions/{name}", web::post().to(exclude_city))
        .route("/sessions/{id}/exclusions/{name}", web::delete().to(include_city));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        catalog_size: state.catalog.len(),
        active_sessions: state.sessions.stats().active,
    })
}

/// Catalog load statistics, including rows dropped for bad coordinates
async fn catalog_stats(state: web::Data<AppState>) -> impl Responder {
    let report = state.catalog.report().clone();
    HttpResponse::Ok().json(CatalogStatsResponse {
        cities: state.catalog.len(),
        distinct_names: state.catalog.city_names().len(),
        dropped: report.dropped(),
        report,
    })
}

/// Sorted distinct city names
///
/// GET /api/v1/cities?prefix=sain
async fn list_cities(
    state: web::Data<AppState>,
    query: web::Query<CitiesQuery>,
) -> impl Responder {
    let names = state.catalog.city_names();
    let cities: Vec<String> = match query.prefix.as_deref().map(str::trim) {
        Some(prefix) if !prefix.is_empty() => {
            let prefix = prefix.to_lowercase();
            names
                .iter()
                .filter(|name| name.to_lowercase().starts_with(&prefix))
                .cloned()
                .collect()
        }
        _ => names.to_vec(),
    };

    HttpResponse::Ok().json(CitiesResponse {
        count: cities.len(),
        cities,
    })
}

/// Stateless radius search
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "origin": "Paris",
///   "radiusKm": 20,
///   "limit": 100
/// }
/// ```
async fn search(state: web::Data<AppState>, req: web::Json<SearchRequest>) -> HttpResponse {
    match run_search(&state, &req) {
        Ok(result) => HttpResponse::Ok().json(SearchResponse::new(None, result)),
        Err(response) => response,
    }
}

/// Open a new form session
async fn create_session(state: web::Data<AppState>) -> impl Responder {
    let session = state.sessions.create().await;
    tracing::info!("Opened session {}", session.id);
    HttpResponse::Created().json(session_response(&session))
}

async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.get(path.into_inner()).await {
        Ok(session) => HttpResponse::Ok().json(session_response(&session)),
        Err(e) => session_error(e),
    }
}

async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.remove(path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => session_error(e),
    }
}

/// Search and record the result in the session
///
/// POST /api/v1/sessions/{id}/search
///
/// The new result replaces the previous one and resets the exclusions.
async fn session_search(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<SearchRequest>,
) -> HttpResponse {
    let id = path.into_inner();

    // Fail on unknown sessions before scanning the catalog
    if let Err(e) = state.sessions.get(id).await {
        return session_error(e);
    }

    let result = match run_search(&state, &req) {
        Ok(result) => result,
        Err(response) => return response,
    };

    let response = SearchResponse::new(Some(id), result.clone());
    match state.sessions.update(id, |s| s.record_search(result)).await {
        Ok(_) => {
            tracing::info!(
                "Session {}: {} cities within {} km of {}",
                id,
                response.count,
                response.radius_km,
                response.origin.name
            );
            HttpResponse::Ok().json(response)
        }
        Err(e) => session_error(e),
    }
}

async fn get_selection(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.get(path.into_inner()).await {
        Ok(session) => selection_response(&session),
        Err(e) => session_error(e),
    }
}

/// Replace the excluded cities of a session
///
/// PUT /api/v1/sessions/{id}/exclusions
///
/// Request body:
/// ```json
/// { "excluded": ["Montreuil", "Vincennes"] }
/// ```
async fn replace_exclusions(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ExclusionsRequest>,
) -> HttpResponse {
    let excluded = req.into_inner().excluded;
    match state
        .sessions
        .update_searched(path.into_inner(), |s| s.set_exclusions(excluded))
        .await
    {
        Ok((session, ())) => selection_response(&session),
        Err(e) => session_error(e),
    }
}

/// Deselect one city
async fn exclude_city(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> HttpResponse {
    let (id, name) = path.into_inner();
    match state.sessions.update_searched(id, |s| s.exclude(&name)).await {
        Ok((session, known)) => {
            if !known {
                tracing::debug!("Session {}: excluded {} is not in the current result", id, name);
            }
            selection_response(&session)
        }
        Err(e) => session_error(e),
    }
}

/// Select a previously excluded city again
async fn include_city(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> HttpResponse {
    let (id, name) = path.into_inner();
    match state.sessions.update_searched(id, |s| s.include(&name)).await {
        Ok((session, _)) => selection_response(&session),
        Err(e) => session_error(e),
    }
}

/// Validate a search request against the configured bounds and run it
fn run_search(state: &AppState, req: &SearchRequest) -> Result<SearchResult, HttpResponse> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: field_errors={:?}", errors);
        return Err(HttpResponse::BadRequest().json(ErrorResponse::new(
            "validation_failed",
            errors.to_string(),
            400,
        )));
    }

    let radius_km = req.radius_km.unwrap_or(state.search.default_radius_km);
    let max_radius = state.search.max_radius_km;
    if radius_km > max_radius {
        return Err(HttpResponse::BadRequest().json(ErrorResponse::new(
            "validation_failed",
            format!("radiusKm must be between 0 and {}", max_radius),
            400,
        )));
    }

    let max_limit = state.search.max_limit;
    let limit = req.limit.unwrap_or(state.search.default_limit);
    if limit > max_limit {
        return Err(HttpResponse::BadRequest().json(ErrorResponse::new(
            "validation_failed",
            format!("limit must be between 1 and {}", max_limit),
            400,
        )));
    }

    state
        .resolver
        .search_by_name(&state.catalog, &req.origin, radius_km, limit)
        .map_err(|e| {
            tracing::info!("Rejected search: {}", e);
            match e {
                QueryError::OriginNotFound(_) => HttpResponse::NotFound()
                    .json(ErrorResponse::new("origin_not_found", e.to_string(), 404)),
                QueryError::InvalidRadius(_) => HttpResponse::BadRequest()
                    .json(ErrorResponse::new("validation_failed", e.to_string(), 400)),
            }
        })
}

fn session_response(session: &Session) -> SessionResponse {
    SessionResponse {
        session_id: session.id,
        created_at: session.created_at,
        result: session.result.clone(),
        selected: session.selection().map(|s| s.names),
        excluded: session.excluded.iter().cloned().collect(),
    }
}

fn selection_response(session: &Session) -> HttpResponse {
    match session.selection() {
        Some(selection) => HttpResponse::Ok().json(SelectionResponse::new(
            session.id,
            selection,
            session.excluded.iter().cloned().collect(),
        )),
        None => session_error(SessionError::NoSearch(session.id)),
    }
}

fn session_error(e: SessionError) -> HttpResponse {
    match e {
        SessionError::NotFound(_) => HttpResponse::NotFound()
            .json(ErrorResponse::new("session_not_found", e.to_string(), 404)),
        SessionError::NoSearch(_) => HttpResponse::Conflict()
            .json(ErrorResponse::new("no_search", e.to_string(), 409)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_status() {
        let id = Uuid::new_v4();
        assert_eq!(session_error(SessionError::NotFound(id)).status(), 404);
        assert_eq!(session_error(SessionError::NoSearch(id)).status(), 409);
    }

    #[test]
    fn test_session_response_before_search() {
        let session = Session::new();
        let response = session_response(&session);

        assert!(response.result.is_none());
        assert!(response.selected.is_none());
        assert!(response.excluded.is_empty());
    }
}
