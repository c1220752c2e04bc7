use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use portal_common::validation::normalize_phone;
use portal_common::{ApplicationStatus, ApplicationSubmission, UserRole};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::identity::{NewUser, UserUpdate};
use crate::models::application::ApplicationResponse;
use crate::models::shared::{ApiResponse, MessageResponse};
use crate::state::AppState;
use crate::store::{
    DocumentStore, GroupQuery, LAST_COMMITTED, paths, server_timestamp, to_document,
};

/// E.164 form of a validated 10-digit phone number.
fn e164_phone(raw: &str) -> Result<String, AppError> {
    normalize_phone(raw)
        .map(|digits| format!("+1{digits}"))
        .ok_or_else(|| AppError::invalid("user.phone_number", "Phone number must have 10 digits"))
}

/// A section body with the owner's email stamped in.
fn section_document<T: Serialize>(
    email: &str,
    section: &T,
) -> Result<Map<String, Value>, AppError> {
    let mut doc = to_document(section)?;
    doc.insert("email".into(), json!(email));
    Ok(doc)
}

/// Write the application, profile, section and team documents for `email`.
///
/// The profile is merged so fields owned by other flows (`checked_in`) survive a
/// resubmission; a new account starts with `checked_in: false`.
async fn save_application(
    store: &dyn DocumentStore,
    email: &str,
    application: &ApplicationSubmission,
    new_account: bool,
) -> Result<(), AppError> {
    let now = server_timestamp();

    let app_doc = json!({
        "status": ApplicationStatus::Submitted,
        "email": email,
        "_submitted": now,
        LAST_COMMITTED: now,
    });
    store
        .set(&paths::application(email), to_document(&app_doc)?)
        .await?;

    let mut profile = Map::new();
    profile.insert("pronouns".into(), json!(application.demographics.pronouns));
    profile.insert(LAST_COMMITTED.into(), now.clone());
    if new_account {
        profile.insert("checked_in".into(), json!(false));
    }
    store.merge(&paths::user(email), profile).await?;

    let sections = [
        (paths::DEMOGRAPHICS, section_document(email, &application.demographics)?),
        (paths::SHORT_RESPONSE, section_document(email, &application.short_response)?),
        (paths::LOGISTICS, section_document(email, &application.logistics)?),
        (paths::SOCIALS, section_document(email, &application.socials)?),
    ];
    for (name, doc) in sections {
        store.set(&paths::section(email, name), doc).await?;
    }

    let team_path = paths::team(email);
    if new_account || store.get(&team_path).await?.is_none() {
        let team = json!({"invites": [], "team_name": "", "team_leader": ""});
        store.set(&team_path, to_document(&team)?).await?;
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/unauthenticated",
    tag = "Application",
    operation_id = "submitApplicationUnauthenticated",
    summary = "Submit an application and create an account",
    description = "Creates the applicant's account from the `user` section (which must include a password), then stores the application and its sections.",
    request_body = ApplicationSubmission,
    responses(
        (status = 200, description = "Application saved and account created", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid application data", body = ErrorBody),
        (status = 409, description = "Email or phone number already registered", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn submit_unauthenticated(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ApplicationSubmission>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    payload.validate_new_account().map_err(AppError::Validation)?;
    let user = payload
        .user
        .as_ref()
        .ok_or_else(|| AppError::invalid("user", "Required"))?;

    let created = state
        .identity
        .create_user(NewUser {
            email: user.email.clone(),
            password: user.password.clone().unwrap_or_default(),
            phone_number: Some(e164_phone(&user.phone_number)?),
            display_name: Some(user.display_name()),
        })
        .await?;
    info!(email = %created.email, "Created user from application");

    save_application(state.store.as_ref(), &created.email, &payload, true).await?;

    Ok(Json(MessageResponse::new(
        "Application saved successfully and user account created",
    )))
}

#[utoipa::path(
    post,
    path = "/authenticated",
    tag = "Application",
    operation_id = "submitApplicationAuthenticated",
    summary = "Submit an application for the signed-in user",
    description = "Stores the application for the caller's email. When `user` is present the account's phone number and display name are updated too.",
    request_body = ApplicationSubmission,
    responses(
        (status = 200, description = "Application saved", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid application data", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 409, description = "Phone number already registered", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(email = %auth_user.email))]
pub async fn submit_authenticated(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ApplicationSubmission>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    payload
        .validate_existing_account()
        .map_err(AppError::Validation)?;

    if let Some(user) = &payload.user {
        state
            .identity
            .update_user(
                &auth_user.uid,
                UserUpdate {
                    phone_number: Some(e164_phone(&user.phone_number)?),
                    display_name: Some(user.display_name()),
                },
            )
            .await?;
        info!("Updated phone number and display name");
    }

    save_application(state.store.as_ref(), &auth_user.email, &payload, false).await?;

    Ok(Json(MessageResponse::new("Application saved successfully")))
}

/// Sections under `application_path`, keyed by section name.
async fn load_sections(
    store: &dyn DocumentStore,
    application_path: &str,
) -> Result<Map<String, Value>, AppError> {
    let sections = store
        .list_collection(&format!("{application_path}/{}", paths::SECTIONS))
        .await?;
    Ok(sections
        .into_iter()
        .map(|doc| (doc.id().to_string(), Value::Object(doc.data)))
        .collect())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Application",
    operation_id = "getOwnApplication",
    summary = "Get the caller's application",
    responses(
        (status = 200, description = "Application with its sections", body = ApiResponse<ApplicationResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 404, description = "No application submitted yet", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn get_own_application(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ApplicationResponse>>, AppError> {
    let path = paths::application(&auth_user.email);
    let application = state
        .store
        .get(&path)
        .await?
        .ok_or_else(|| AppError::NotFound("No application found".into()))?;

    let sections = load_sections(state.store.as_ref(), &path).await?;

    Ok(Json(ApiResponse::new(ApplicationResponse {
        email: auth_user.email,
        application: application.data,
        sections,
    })))
}

#[utoipa::path(
    get,
    path = "/export",
    tag = "Application",
    operation_id = "exportApplications",
    summary = "Export every application",
    description = "Returns every application document with its sections, ordered by email, for offline review. Requires the `admin` or `judge` role.",
    responses(
        (status = 200, description = "All applications", body = ApiResponse<Vec<ApplicationResponse>>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Forbidden, missing required authorization role", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn export_applications(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ApplicationResponse>>>, AppError> {
    auth_user.require_any_role(&[UserRole::Admin, UserRole::Judge])?;

    let applications = state
        .store
        .collection_group(&GroupQuery::new(paths::USER_ITEMS).document(paths::APPLICATION))
        .await?;
    let sections = state
        .store
        .collection_group(&GroupQuery::new(paths::SECTIONS))
        .await?;

    let mut by_owner: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    for doc in sections {
        if let Some(email) = paths::owner(&doc.path) {
            let id = doc.id().to_string();
            by_owner
                .entry(email.to_string())
                .or_default()
                .insert(id, Value::Object(doc.data));
        }
    }

    let exported: Vec<ApplicationResponse> = applications
        .into_iter()
        .filter_map(|doc| {
            let email = paths::owner(&doc.path)?.to_string();
            let sections = by_owner.remove(&email).unwrap_or_default();
            Some(ApplicationResponse {
                email,
                application: doc.data,
                sections,
            })
        })
        .collect();

    info!(count = exported.len(), "Exported applications");
    Ok(Json(ApiResponse::new(exported)))
}
