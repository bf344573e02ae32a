//! HTTP routes.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request, State,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use questbound_domain::{
    CustomStat, CustomStatId, CustomStatUpdate, DomainError, FailureReport, InventoryItem,
    InventoryItemId, NewCustomStat, NewQuest, Power, PowerId, PowerUpdate, Quest, QuestId,
    QuestUpdate, ShopItem, ShopItemId, ShopItemInput, User, UserId,
};

use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::{
    custom_stats::CustomStatError,
    inventory::{InventoryError, UseItemRequest, UseItemResult},
    powers::{EvolutionLinkRequest, PowerError, PowerLevelUpResult},
    quests::{QuestCompletionResult, QuestError},
    shop::{PurchaseRequest, PurchaseResult, ShopError},
    users::{NewUser, PowerCategories, UserError},
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        // Users
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/reset", post(reset_user))
        .route(
            "/api/users/{id}/categories",
            get(get_categories).post(save_categories),
        )
        .route(
            "/api/users/{id}/stats",
            get(list_custom_stats).post(create_custom_stat),
        )
        .route(
            "/api/users/{id}/stats/{stat_id}",
            put(update_custom_stat).delete(delete_custom_stat),
        )
        // Quests
        .route("/api/quests", post(create_quest))
        .route(
            "/api/quests/{id}",
            get(list_quests).put(update_quest).delete(delete_quest),
        )
        .route("/api/quests/{id}/complete", post(complete_quest))
        .route("/api/quests/{id}/check-failures", post(check_failures))
        // Shop
        .route("/api/shop", get(list_shop).post(create_shop_item))
        .route("/api/shop/clear-all", delete(clear_shop))
        .route("/api/shop/purchase", post(purchase))
        .route(
            "/api/shop/{id}",
            put(update_shop_item).delete(delete_shop_item),
        )
        // Inventory
        .route(
            "/api/inventory/{id}",
            get(list_inventory).delete(delete_inventory_item),
        )
        .route("/api/inventory/{id}/use", post(use_inventory_item))
        // Powers
        .route("/api/powers/categories/all", get(power_categories))
        .route(
            "/api/powers/{id}",
            get(list_powers).put(update_power).delete(delete_power),
        )
        .route("/api/powers/{id}/levelup", post(level_up_power))
        .route("/api/powers/{id}/link-evolution", post(link_evolution))
        .route("/api/powers/{id}/unlink-evolution", post(unlink_evolution))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "message": format!("{what} deleted") }))
}

// =============================================================================
// Users
// =============================================================================

async fn create_user(
    State(app): State<Arc<App>>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(app.use_cases.users.ops.create(input).await?))
}

async fn list_users(State(app): State<Arc<App>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(app.use_cases.users.ops.list().await?))
}

async fn get_user(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(app.use_cases.users.ops.get(UserId::from_uuid(id)).await?))
}

async fn reset_user(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(app.use_cases.users.ops.reset(UserId::from_uuid(id)).await?))
}

async fn get_categories(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PowerCategories>, ApiError> {
    let categories = app
        .use_cases
        .users
        .ops
        .categories(UserId::from_uuid(id))
        .await?;
    Ok(Json(categories))
}

async fn save_categories(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(categories): ApiJson<PowerCategories>,
) -> Result<Json<PowerCategories>, ApiError> {
    let categories = app
        .use_cases
        .users
        .ops
        .save_categories(UserId::from_uuid(id), categories)
        .await?;
    Ok(Json(categories))
}

// =============================================================================
// Custom stats
// =============================================================================

async fn list_custom_stats(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<CustomStat>>, ApiError> {
    let stats = app
        .use_cases
        .custom_stats
        .ops
        .list(UserId::from_uuid(id))
        .await?;
    Ok(Json(stats))
}

async fn create_custom_stat(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewCustomStat>,
) -> Result<Json<CustomStat>, ApiError> {
    let stat = app
        .use_cases
        .custom_stats
        .ops
        .create(UserId::from_uuid(id), input)
        .await?;
    Ok(Json(stat))
}

async fn update_custom_stat(
    State(app): State<Arc<App>>,
    ApiPath((id, stat_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(update): ApiJson<CustomStatUpdate>,
) -> Result<Json<CustomStat>, ApiError> {
    let stat = app
        .use_cases
        .custom_stats
        .ops
        .update(
            UserId::from_uuid(id),
            CustomStatId::from_uuid(stat_id),
            update,
        )
        .await?;
    Ok(Json(stat))
}

async fn delete_custom_stat(
    State(app): State<Arc<App>>,
    ApiPath((id, stat_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    app.use_cases
        .custom_stats
        .ops
        .delete(UserId::from_uuid(id), CustomStatId::from_uuid(stat_id))
        .await?;
    Ok(deleted("Custom stat"))
}

// =============================================================================
// Quests
// =============================================================================

async fn create_quest(
    State(app): State<Arc<App>>,
    ApiJson(input): ApiJson<NewQuest>,
) -> Result<Json<Quest>, ApiError> {
    Ok(Json(app.use_cases.quests.ops.create(input).await?))
}

/// `{id}` is the owning user's id here.
async fn list_quests(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Quest>>, ApiError> {
    let quests = app
        .use_cases
        .quests
        .list
        .execute(UserId::from_uuid(id))
        .await?;
    Ok(Json(quests))
}

async fn update_quest(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<QuestUpdate>,
) -> Result<Json<Quest>, ApiError> {
    let quest = app
        .use_cases
        .quests
        .ops
        .update(QuestId::from_uuid(id), update)
        .await?;
    Ok(Json(quest))
}

async fn delete_quest(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    app.use_cases.quests.ops.delete(QuestId::from_uuid(id)).await?;
    Ok(deleted("Quest"))
}

async fn complete_quest(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<QuestCompletionResult>, ApiError> {
    let result = app
        .use_cases
        .quests
        .complete
        .execute(QuestId::from_uuid(id))
        .await?;
    Ok(Json(result))
}

/// `{id}` is the user whose deadlines are checked.
async fn check_failures(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<FailureReport>, ApiError> {
    let report = app
        .use_cases
        .quests
        .check_failures
        .execute(UserId::from_uuid(id))
        .await?;
    Ok(Json(report))
}

// =============================================================================
// Shop
// =============================================================================

async fn list_shop(State(app): State<Arc<App>>) -> Result<Json<Vec<ShopItem>>, ApiError> {
    Ok(Json(app.use_cases.shop.ops.list().await?))
}

async fn create_shop_item(
    State(app): State<Arc<App>>,
    ApiJson(input): ApiJson<ShopItemInput>,
) -> Result<Json<ShopItem>, ApiError> {
    Ok(Json(app.use_cases.shop.ops.create(input).await?))
}

async fn update_shop_item(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ShopItemInput>,
) -> Result<Json<ShopItem>, ApiError> {
    let item = app
        .use_cases
        .shop
        .ops
        .update(ShopItemId::from_uuid(id), input)
        .await?;
    Ok(Json(item))
}

async fn delete_shop_item(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    app.use_cases.shop.ops.delete(ShopItemId::from_uuid(id)).await?;
    Ok(deleted("Shop item"))
}

async fn clear_shop(State(app): State<Arc<App>>) -> Result<Json<Value>, ApiError> {
    let removed = app.use_cases.shop.ops.clear_all().await?;
    Ok(Json(json!({ "deleted_count": removed })))
}

async fn purchase(
    State(app): State<Arc<App>>,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> Result<Json<PurchaseResult>, ApiError> {
    Ok(Json(app.use_cases.shop.purchase.execute(request).await?))
}

// =============================================================================
// Inventory
// =============================================================================

/// `{id}` is the owning user's id here.
async fn list_inventory(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let items = app
        .use_cases
        .inventory
        .ops
        .list(UserId::from_uuid(id))
        .await?;
    Ok(Json(items))
}

async fn delete_inventory_item(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    app.use_cases
        .inventory
        .ops
        .delete(InventoryItemId::from_uuid(id))
        .await?;
    Ok(deleted("Inventory item"))
}

async fn use_inventory_item(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UseItemRequest>,
) -> Result<Json<UseItemResult>, ApiError> {
    let result = app
        .use_cases
        .inventory
        .use_item
        .execute(InventoryItemId::from_uuid(id), request)
        .await?;
    Ok(Json(result))
}

// =============================================================================
// Powers
// =============================================================================

/// `{id}` is the owning user's id here.
async fn list_powers(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Power>>, ApiError> {
    Ok(Json(app.use_cases.powers.ops.list(UserId::from_uuid(id)).await?))
}

async fn power_categories(State(app): State<Arc<App>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(app.use_cases.powers.ops.categories().await?))
}

async fn update_power(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<PowerUpdate>,
) -> Result<Json<Power>, ApiError> {
    let power = app
        .use_cases
        .powers
        .ops
        .update(PowerId::from_uuid(id), update)
        .await?;
    Ok(Json(power))
}

async fn delete_power(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    app.use_cases.powers.ops.delete(PowerId::from_uuid(id)).await?;
    Ok(deleted("Power"))
}

async fn level_up_power(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PowerLevelUpResult>, ApiError> {
    let result = app
        .use_cases
        .powers
        .level_up
        .execute(PowerId::from_uuid(id))
        .await?;
    Ok(Json(result))
}

async fn link_evolution(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<EvolutionLinkRequest>,
) -> Result<Json<Vec<Power>>, ApiError> {
    let changed = app
        .use_cases
        .powers
        .link
        .execute(PowerId::from_uuid(id), request)
        .await?;
    Ok(Json(changed))
}

async fn unlink_evolution(
    State(app): State<Arc<App>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<EvolutionLinkRequest>,
) -> Result<Json<Vec<Power>>, ApiError> {
    let changed = app
        .use_cases
        .powers
        .unlink
        .execute(PowerId::from_uuid(id), request)
        .await?;
    Ok(Json(changed))
}

// =============================================================================
// Extractors
// =============================================================================

/// `Json` body whose rejections use the `{"detail"}` error body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Path` parameters whose rejections use the `{"detail"}` error body.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            DomainError::Validation(_)
            | DomainError::InvalidState(_)
            | DomainError::InsufficientResource { .. } => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            RepoError::Conflict(_) => ApiError::Conflict(e.to_string()),
            RepoError::Database { .. } | RepoError::Serialization(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

macro_rules! impl_from_area_error {
    ($($area:ident),* $(,)?) => {
        $(
            impl From<$area> for ApiError {
                fn from(e: $area) -> Self {
                    match e {
                        $area::Domain(e) => e.into(),
                        $area::Repo(e) => e.into(),
                    }
                }
            }
        )*
    };
}

impl_from_area_error!(
    UserError,
    QuestError,
    ShopError,
    InventoryError,
    PowerError,
    CustomStatError,
);
