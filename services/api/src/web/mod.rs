pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use auth::{auth_events_handler, login_handler, logout_handler, me_handler, signup_handler};
use rest::{
    article_handler, create_prompt_handler, delete_prompt_handler, generate_from_prompt_handler,
    generate_handler, gtm_plan_handler, humanize_handler, list_prompts_handler,
    trending_categories_handler, trending_handler, update_prompt_handler, video_handler,
};
use state::AppState;

pub use middleware::require_auth;

/// The API routes, with the session middleware on everything but signup,
/// login and logout.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(me_handler))
        .route("/auth/events", get(auth_events_handler))
        .route("/content/generate", post(generate_handler))
        .route("/content/article", post(article_handler))
        .route("/content/video", post(video_handler))
        .route("/content/humanize", post(humanize_handler))
        .route("/plans/gtm", post(gtm_plan_handler))
        .route("/trending", get(trending_handler))
        .route("/trending/categories", get(trending_categories_handler))
        .route("/prompts", get(list_prompts_handler).post(create_prompt_handler))
        .route(
            "/prompts/{id}",
            put(update_prompt_handler).delete(delete_prompt_handler),
        )
        .route("/prompts/{id}/generate", post(generate_from_prompt_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
