// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{
        attributes, exam_configs, history, maintenance, questions, session, study, subjects, transfer,
    },
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (catalogue, engines, import/export, maintenance).
/// * Applies global middleware (Trace, CORS).
/// * Serves the built UI from `STATIC_DIR` when configured.
/// * Injects global state (store, session slot, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let attribute_routes = Router::new()
        .route("/", get(attributes::get_attributes).put(attributes::replace_attributes))
        .route("/{kind}", post(attributes::add_attribute))
        .route("/{kind}/{value}", delete(attributes::remove_attribute));

    let subject_routes = Router::new()
        .route("/", get(subjects::list_subjects).post(subjects::create_subject))
        .route("/lookup", get(subjects::lookup_subject))
        .route(
            "/{id}",
            get(subjects::get_subject)
                .put(subjects::update_subject)
                .delete(subjects::delete_subject),
        )
        .route("/{id}/questions", get(subjects::subject_questions));

    let question_routes = Router::new()
        .route("/", get(questions::list_questions).post(questions::create_question))
        .route("/{id}", get(questions::get_question).put(questions::update_question));

    let exam_config_routes = Router::new()
        .route(
            "/",
            get(exam_configs::list_exam_configs).post(exam_configs::create_exam_config),
        )
        .route(
            "/{id}",
            put(exam_configs::update_exam_config).delete(exam_configs::delete_exam_config),
        );

    let history_routes = Router::new()
        .route("/", get(history::list_history))
        .route("/{id}", get(history::get_result))
        .route("/{id}/review", get(history::review_result));

    let session_routes = Router::new()
        .route("/", get(session::current).delete(session::discard))
        .route("/exam/{config_id}", post(session::start_exam))
        .route("/self-select", post(session::start_self_select))
        .route("/retry/{result_id}", post(session::retry))
        .route("/answer", post(session::answer))
        .route("/submit", post(session::submit))
        .route("/last-result", get(session::last_result));

    let study_routes = Router::new()
        .route("/", get(study::current).post(study::start).delete(study::stop))
        .route("/answer", post(study::answer))
        .route("/reset", post(study::reset))
        .route("/goto", post(study::go_to));

    let static_dir = state.config.static_dir.clone();

    let api = Router::new()
        .nest("/api/attributes", attribute_routes)
        .nest("/api/subjects", subject_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/exam-configs", exam_config_routes)
        .nest("/api/history", history_routes)
        .nest("/api/session", session_routes)
        .nest("/api/study", study_routes)
        .route("/api/import/json", post(transfer::import_json))
        .route("/api/import/table", post(transfer::import_table))
        .route("/api/import/remote", post(transfer::import_remote))
        .route("/api/export", get(transfer::export_all))
        .route("/api/data", delete(maintenance::wipe_all));

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
