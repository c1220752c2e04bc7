use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/application", application_routes())
        .nest("/users", user_routes())
        .nest("/statistics", statistics_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::test))
        .routes(routes!(handlers::auth::test_authenticated))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn application_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::application::get_own_application))
        .routes(routes!(handlers::application::submit_unauthenticated))
        .routes(routes!(handlers::application::submit_authenticated))
        .routes(routes!(handlers::application::export_applications))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::users::list_users))
        .routes(routes!(handlers::users::set_user_role))
}

fn statistics_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::statistics::get_statistics))
        .routes(routes!(handlers::statistics::generate_statistics))
}
