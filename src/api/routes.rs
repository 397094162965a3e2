//! API Routes
//!
//! HTTP endpoint definitions. Every route lives under `/auth`.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenService, TokenUser};
use crate::catalog::{CatalogService, EventListing, EventView, PurchaseView};
use crate::domain::card::mask_card_number;
use crate::domain::validation::positive_id;
use crate::domain::RequestContext;
use crate::error::AppError;
use crate::handlers::{
    ensure_caller, AccountSession, AssignSpeakerCommand, AssignSpeakerHandler,
    ChangePasswordCommand, ChangePasswordHandler, CardOutcome, LoginCommand, LoginHandler,
    RegisterForEventCommand, RegisterForEventHandler, RegisterUserCommand, RegisterUserHandler,
    RegistrationResult, SaveCardCommand, SaveCardHandler, SpeakerAssignment,
    UpdateProfileCommand, UpdateProfileHandler,
};
use crate::store::accounts::latest_card;
use crate::store::{CardRow, PgRegistrationStore, UserRow};

use super::extractor::{AuthenticatedUser, ValidJson, ValidPath};
use super::response::ApiResponse;
use super::AppState;

const TOKEN_TYPE: &str = "Bearer";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub id_user: i64,
    #[serde(default)]
    pub numero_tarjeta: String,
    #[serde(default)]
    pub vencimiento_tarjeta: String,
    #[serde(default)]
    pub cvc_tarjeta: String,
    #[serde(default)]
    pub nombre_tarjeta: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterEventRequest {
    pub id_evento: i64,
    pub id_user: i64,
    pub id_tarjeta_pago: i64,
    pub cantidad_pago: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListPurchasesRequest {
    pub id_user: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignSpeakerRequest {
    pub id_evento: i64,
    pub id_ponente: i64,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRow> for UserView {
    fn from(user: &UserRow) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Card echo; the number is always masked
#[derive(Debug, Serialize)]
pub struct CardView {
    pub id: i64,
    pub numero_tarjeta: String,
    pub vencimiento_tarjeta: String,
    pub nombre_tarjeta: String,
    pub fecha_creacion: DateTime<Utc>,
}

impl From<&CardRow> for CardView {
    fn from(card: &CardRow) -> Self {
        Self {
            id: card.id,
            numero_tarjeta: mask_card_number(&card.card_number),
            vencimiento_tarjeta: card.expiry.clone(),
            nombre_tarjeta: card.holder_name.clone(),
            fecha_creacion: card.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserView,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserView,
    pub token: String,
    pub expires_in: i64,
    pub token_type: &'static str,
    pub card: Option<CardView>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserView,
    pub card: Option<CardView>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct TokenValidationResponse {
    pub valid: bool,
    pub user_id: i64,
    pub email: String,
    pub expires_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub token: String,
    pub expires_in: i64,
    pub token_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub tarjeta: CardView,
}

#[derive(Debug, Serialize)]
pub struct PurchasesResponse {
    pub compras: Vec<PurchaseView>,
}

#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    pub evento: EventView,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router (mounted under `/auth`)
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route("/validate-token", post(validate_token))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        // Payments
        .route("/crear-tarjeta", post(create_card))
        .route("/registro-evento", post(register_for_event))
        .route("/listar-compras", post(list_purchases))
        // Catalog
        .route("/listar-eventos", get(list_events))
        .route("/evento/:id", get(event_detail))
        .route("/asignar-ponente-evento", post(assign_speaker))
}

// =========================================================================
// Accounts
// =========================================================================

async fn register(
    State(pool): State<PgPool>,
    State(tokens): State<TokenService>,
    State(passwords): State<PasswordHasher>,
    Extension(context): Extension<RequestContext>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<ApiResponse<RegisterResponse>, AppError> {
    let handler = RegisterUserHandler::new(pool, tokens.clone(), passwords);
    let command = RegisterUserCommand::new(
        request.email,
        request.password,
        request.first_name,
        request.last_name,
    );

    let AccountSession { user, token, .. } = handler.execute(command, &context).await?;

    Ok(ApiResponse::created(
        RegisterResponse {
            user: UserView::from(&user),
            token: token.token,
            expires_in: tokens.ttl_seconds(),
        },
        "User registered successfully",
    ))
}

async fn login(
    State(pool): State<PgPool>,
    State(tokens): State<TokenService>,
    State(passwords): State<PasswordHasher>,
    Extension(context): Extension<RequestContext>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let handler = LoginHandler::new(pool, tokens.clone(), passwords);
    let session = handler
        .execute(LoginCommand::new(request.email, request.password), &context)
        .await?;

    Ok(ApiResponse::ok(
        LoginResponse {
            user: UserView::from(&session.user),
            token: session.token.token,
            expires_in: tokens.ttl_seconds(),
            token_type: TOKEN_TYPE,
            card: session.card.as_ref().map(CardView::from),
        },
        "Login successful",
    ))
}

async fn profile(
    State(pool): State<PgPool>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse<ProfileResponse>, AppError> {
    let card = latest_card(&pool, auth.id()).await?;

    Ok(ApiResponse::ok(
        ProfileResponse {
            user: UserView::from(&auth.user),
            card: card.as_ref().map(CardView::from),
        },
        "Profile retrieved successfully",
    ))
}

async fn update_profile(
    State(pool): State<PgPool>,
    Extension(context): Extension<RequestContext>,
    auth: AuthenticatedUser,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> Result<ApiResponse<UpdateProfileResponse>, AppError> {
    let context = context.with_request_user(auth.id());
    let command = UpdateProfileCommand {
        first_name: request.first_name,
        last_name: request.last_name,
    };

    let user = UpdateProfileHandler::new(pool)
        .execute(auth.id(), command, &context)
        .await?;

    Ok(ApiResponse::ok(
        UpdateProfileResponse {
            user: UserView::from(&user),
        },
        "Profile updated successfully",
    ))
}

async fn change_password(
    State(pool): State<PgPool>,
    State(passwords): State<PasswordHasher>,
    Extension(context): Extension<RequestContext>,
    auth: AuthenticatedUser,
    ValidJson(request): ValidJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let context = context.with_request_user(auth.id());
    let command = ChangePasswordCommand {
        current_password: request.current_password,
        new_password: request.new_password,
    };

    ChangePasswordHandler::new(pool, passwords)
        .execute(&auth.user, command, &context)
        .await?;

    Ok(ApiResponse::message_only("Password changed successfully"))
}

async fn validate_token(auth: AuthenticatedUser) -> ApiResponse<TokenValidationResponse> {
    let expires_at = auth
        .claims
        .expires_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string());

    ApiResponse::ok(
        TokenValidationResponse {
            valid: true,
            user_id: auth.user.id,
            email: auth.user.email,
            expires_at,
        },
        "Token is valid",
    )
}

async fn refresh_token(
    State(tokens): State<TokenService>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse<RefreshTokenResponse>, AppError> {
    if !auth.claims.is_refreshable(Utc::now().timestamp()) {
        return Err(AppError::InvalidArgument(
            "The token is still valid and does not need to be refreshed".to_string(),
        ));
    }

    let issued = tokens
        .issue(TokenUser::from(&auth.user))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = auth.id(), "Token refreshed");

    Ok(ApiResponse::ok(
        RefreshTokenResponse {
            token: issued.token,
            expires_in: tokens.ttl_seconds(),
            token_type: TOKEN_TYPE,
        },
        "Token refreshed successfully",
    ))
}

async fn logout(
    Extension(context): Extension<RequestContext>,
    auth: AuthenticatedUser,
) -> ApiResponse<()> {
    tracing::info!(
        user_id = auth.id(),
        correlation_id = ?context.correlation_id,
        "User logged out"
    );
    ApiResponse::message_only("Logged out successfully")
}

// =========================================================================
// Payments
// =========================================================================

async fn create_card(
    State(pool): State<PgPool>,
    Extension(context): Extension<RequestContext>,
    auth: AuthenticatedUser,
    ValidJson(request): ValidJson<CreateCardRequest>,
) -> Result<ApiResponse<CardResponse>, AppError> {
    let context = context.with_request_user(auth.id());
    let command = SaveCardCommand::new(
        request.id_user,
        request.numero_tarjeta,
        request.vencimiento_tarjeta,
        request.cvc_tarjeta,
        request.nombre_tarjeta,
    );

    let result = SaveCardHandler::new(pool).execute(command, &context).await?;

    let status = match result.outcome {
        CardOutcome::Created => StatusCode::CREATED,
        CardOutcome::Updated => StatusCode::OK,
    };

    Ok(ApiResponse::new(
        status,
        result.outcome.message(),
        Some(CardResponse {
            tarjeta: CardView::from(&result.card),
        }),
    ))
}

async fn register_for_event(
    State(pool): State<PgPool>,
    Extension(context): Extension<RequestContext>,
    auth: AuthenticatedUser,
    ValidJson(request): ValidJson<RegisterEventRequest>,
) -> Result<ApiResponse<RegistrationResult>, AppError> {
    let context = context.with_request_user(auth.id());
    let command = RegisterForEventCommand::new(
        request.id_evento,
        request.id_user,
        request.id_tarjeta_pago,
        request.cantidad_pago,
    );

    let result = RegisterForEventHandler::new(PgRegistrationStore::new(pool))
        .execute(command, &context)
        .await?;

    Ok(ApiResponse::ok(result, "Event registration successful"))
}

async fn list_purchases(
    State(pool): State<PgPool>,
    Extension(context): Extension<RequestContext>,
    auth: AuthenticatedUser,
    ValidJson(request): ValidJson<ListPurchasesRequest>,
) -> Result<ApiResponse<PurchasesResponse>, AppError> {
    let context = context.with_request_user(auth.id());
    let user_id = positive_id("user id", request.id_user)?;
    ensure_caller(&context, user_id)?;

    let compras = CatalogService::new(pool).list_purchases(user_id).await?;

    Ok(ApiResponse::ok(
        PurchasesResponse { compras },
        "Purchases listed successfully",
    ))
}

// =========================================================================
// Catalog
// =========================================================================

async fn list_events(State(pool): State<PgPool>) -> Result<ApiResponse<EventListing>, AppError> {
    let listing = CatalogService::new(pool).list_active_events().await?;
    Ok(ApiResponse::ok(listing, "Events retrieved successfully"))
}

async fn event_detail(
    State(pool): State<PgPool>,
    ValidPath(event_id): ValidPath<i64>,
) -> Result<ApiResponse<EventDetailResponse>, AppError> {
    let evento = CatalogService::new(pool).event_detail(event_id).await?;
    Ok(ApiResponse::ok(
        EventDetailResponse { evento },
        "Event retrieved successfully",
    ))
}

async fn assign_speaker(
    State(pool): State<PgPool>,
    Extension(context): Extension<RequestContext>,
    auth: AuthenticatedUser,
    ValidJson(request): ValidJson<AssignSpeakerRequest>,
) -> Result<ApiResponse<SpeakerAssignment>, AppError> {
    let context = context.with_request_user(auth.id());
    let command = AssignSpeakerCommand {
        event_id: request.id_evento,
        speaker_id: request.id_ponente,
    };

    let assignment = AssignSpeakerHandler::new(pool)
        .execute(command, &context)
        .await?;

    Ok(ApiResponse::created(
        assignment,
        "Speaker assigned to event successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_register_event_request_deserialize() {
        let json = r#"{
            "id_evento": 1,
            "id_user": 2,
            "id_tarjeta_pago": 3,
            "cantidad_pago": "120.50"
        }"#;

        let request: RegisterEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.id_evento, 1);
        assert_eq!(request.id_tarjeta_pago, 3);
        assert_eq!(request.cantidad_pago, dec!(120.50));
    }

    #[test]
    fn test_register_event_request_numeric_amount() {
        let json = r#"{"id_evento": 1, "id_user": 2, "id_tarjeta_pago": 3, "cantidad_pago": 75}"#;
        let request: RegisterEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.cantidad_pago, dec!(75));
    }

    #[test]
    fn test_create_card_request_defaults() {
        let request: CreateCardRequest = serde_json::from_str(r#"{"id_user": 5}"#).unwrap();
        assert_eq!(request.id_user, 5);
        assert!(request.numero_tarjeta.is_empty());
        assert!(request.cvc_tarjeta.is_empty());
    }

    #[test]
    fn test_register_request_missing_fields_default_to_empty() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert_eq!(request.email, "a@b.com");
        assert!(request.password.is_empty());
    }

    #[test]
    fn test_card_view_masks_number() {
        let card = CardRow {
            id: 1,
            user_id: 2,
            card_number: "4111111111111111".to_string(),
            expiry: "07/27".to_string(),
            cvc: "123".to_string(),
            holder_name: "ANA LOPEZ".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(CardView::from(&card)).unwrap();
        assert_eq!(json["numero_tarjeta"], "************1111");
        assert_eq!(json["nombre_tarjeta"], "ANA LOPEZ");
        assert!(json.get("cvc_tarjeta").is_none());
    }
}
