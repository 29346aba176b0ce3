//! First sign-in registration.

use api_types::user::UserView;
use axum::{Extension, Json, extract::State};
use engine::NewUser;

use crate::{Identity, ServerError, server::ServerState};

/// Store the caller on first sign-in; later calls return the existing record.
pub async fn sync(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .register_user(NewUser {
            external_id: identity.external_id,
            email: identity.email.unwrap_or_default(),
            name: identity.name,
            image_url: None,
        })
        .await?;

    Ok(Json(user.view()))
}
