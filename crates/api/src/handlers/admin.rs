//! Admin handlers for the one account action the core owns: ban/unban.
//!
//! Catalog and plan management are external collaborators; ban lives here
//! because banning must also destroy the target's sessions, which is part
//! of the session lifecycle contract.

use axum::extract::{Path, State};
use axum::Json;
use knox_core::error::CoreError;
use knox_core::types::DbId;
use knox_db::models::user::UserResponse;
use knox_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users/{id}/ban`.
#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub banned: bool,
}

/// POST /api/v1/admin/users/{id}/ban
///
/// Set or clear a user's banned flag. Banning deletes every session of the
/// target immediately; validation also re-checks the flag on every request,
/// so even a racing session dies on its next call.
pub async fn ban_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<DbId>,
    Json(input): Json<BanRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::set_banned(&state.pool, id, input.banned)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            })
        })?;

    if input.banned {
        let revoked = SessionRepo::delete_all_for_user(&state.pool, id).await?;
        tracing::info!(user_id = id, revoked, "User banned, sessions destroyed");
    }

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
