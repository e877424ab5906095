//! Handlers for the `/users` resource.
//!
//! Listing, creation and deletion are super-admin only. Users may read and
//! rename themselves and change their own password; only a super-admin can
//! change a role.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sitelog_core::error::CoreError;
use sitelog_core::pagination::DEFAULT_USERS_PER_PAGE;
use sitelog_core::roles::{Role, RoleCode, ROLE_CODE_ADMIN, ROLE_CODE_REGULAR, ROLE_CODE_SUPER_ADMIN};
use sitelog_core::types::DbId;
use sitelog_core::validation::{validate_password_policy, validate_username};
use sitelog_db::models::user::{CreateUser, UpdateUser, UserFilter, UserResponse};
use sitelog_db::repositories::{SessionRepo, UserRepo};
use validator::{Validate, ValidationError};

use super::not_found;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult, DUPLICATE_USERNAME_MESSAGE};
use crate::extract::{ApiQuery, ValidJson};
use crate::middleware::rbac::{RequireSelf, RequireSuperAdmin, RequireSuperAdminOrSelf};
use crate::query::UserListParams;
use crate::response::{ApiResponse, Paginated};
use crate::tx::RequestTx;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,
    /// Defaults to admin, the role that owns projects.
    #[serde(default = "default_role")]
    #[validate(custom(function = "validate_role_code"))]
    pub role: RoleCode,
}

/// Request body for `PATCH /api/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    /// Omitted means unchanged.
    #[validate(custom(function = "validate_role_code"))]
    pub role: Option<RoleCode>,
}

/// Request body for `PATCH /api/users/{id}/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,
    #[validate(custom(function = "validate_password_policy"))]
    pub new_password: String,
}

fn default_role() -> RoleCode {
    ROLE_CODE_ADMIN
}

fn validate_role_code(role: &RoleCode) -> Result<(), ValidationError> {
    match *role {
        ROLE_CODE_ADMIN | ROLE_CODE_REGULAR | ROLE_CODE_SUPER_ADMIN => Ok(()),
        _ => Err(ValidationError::new("role").with_message("Invalid role".into())),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/users
pub async fn list(
    _auth: RequireSuperAdmin,
    mut tx: RequestTx,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page = params.page(DEFAULT_USERS_PER_PAGE);
    let filter = UserFilter {
        search: params.search,
        role: params.role,
        from_date: params.from_date,
        to_date: params.to_date,
        page,
    };
    let (users, total) = UserRepo::search(tx.conn(), &filter).await?;
    tx.commit().await?;

    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new("Get Users Data", "users", users, total, page)))
}

/// POST /api/users
pub async fn create(
    auth: RequireSuperAdmin,
    mut tx: RequestTx,
    ValidJson(input): ValidJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    if UserRepo::find_by_username(tx.conn(), &input.username)
        .await?
        .is_some()
    {
        return Err(duplicate_username());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        tx.conn(),
        &CreateUser {
            username: input.username,
            password_hash,
            role: input.role,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, created_by = auth.user.user_id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data("Create User Success", UserResponse::from(user))),
    ))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    _auth: RequireSuperAdminOrSelf,
    Path(id): Path<DbId>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(tx.conn(), id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    tx.commit().await?;

    Ok(Json(ApiResponse::with_data(
        "Get User By ID",
        UserResponse::from(user),
    )))
}

/// PATCH /api/users/{id}
pub async fn update(
    auth: RequireSuperAdminOrSelf,
    Path(id): Path<DbId>,
    mut tx: RequestTx,
    ValidJson(input): ValidJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let current = UserRepo::find_by_id(tx.conn(), id)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    // A self-edit by anyone but a super-admin keeps the stored role.
    let role = match auth.user.role {
        Role::SuperAdmin => input.role.unwrap_or(current.role),
        Role::Admin | Role::Regular => current.role,
    };

    if input.username != current.username {
        let taken = UserRepo::find_by_username(tx.conn(), &input.username).await?;
        if taken.is_some_and(|other| other.id != id) {
            return Err(duplicate_username());
        }
    }

    let user = UserRepo::update(
        tx.conn(),
        id,
        &UpdateUser {
            username: input.username,
            role,
        },
    )
    .await?
    .ok_or_else(|| not_found("User", id))?;
    tx.commit().await?;

    tracing::info!(user_id = id, updated_by = auth.user.user_id, "User updated");
    Ok(Json(ApiResponse::with_data(
        "Update User Success",
        UserResponse::from(user),
    )))
}

/// PATCH /api/users/{id}/password
///
/// Requires the current password. Every browser session of the user is
/// ended, so other devices have to sign in again.
pub async fn change_password(
    auth: RequireSelf,
    Path(id): Path<DbId>,
    mut tx: RequestTx,
    ValidJson(input): ValidJson<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let user = UserRepo::find_by_id(tx.conn(), id)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    let matches = verify_password(&input.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !matches {
        return Err(AppError::validation("Old password is incorrect"));
    }

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(tx.conn(), id, &password_hash).await?;
    let ended = SessionRepo::delete_all_for_user(tx.conn(), id).await?;
    tx.commit().await?;

    tracing::info!(user_id = auth.user.user_id, sessions_ended = ended, "Password changed");
    Ok(Json(ApiResponse::message("Change Password Success")))
}

/// DELETE /api/users/{id}
///
/// Soft delete: the row stays, the username is freed, sessions end.
pub async fn delete(
    auth: RequireSuperAdmin,
    Path(id): Path<DbId>,
    mut tx: RequestTx,
) -> AppResult<Json<ApiResponse<()>>> {
    if id == auth.user.user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }

    if !UserRepo::soft_delete(tx.conn(), id).await? {
        return Err(not_found("User", id));
    }
    SessionRepo::delete_all_for_user(tx.conn(), id).await?;
    tx.commit().await?;

    tracing::info!(user_id = id, deleted_by = auth.user.user_id, "User deleted");
    Ok(Json(ApiResponse::message("Delete User Success")))
}

fn duplicate_username() -> AppError {
    AppError::Core(CoreError::Conflict(DUPLICATE_USERNAME_MESSAGE.into()))
}
