use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use auth_services::service::AuthService;
use auth_services::session::SessionContext;
use auth_services::types::{UpdateProfileRequest, User};

use crate::campground_service::CampgroundService;
use crate::ownership::{GatePolicy, authorize, see_other};
use crate::views::{self, PageContext};

/// Public profile page: the user plus every campground they authored.
pub async fn show(
    pool: web::Data<PgPool>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let id = path.into_inner();
    let auth = AuthService::new(pool.get_ref().clone());

    let found = match auth.get_user_by_id(&id).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("failed to load user {}: {}", id, e);
            None
        }
    };

    let Some(user) = found else {
        session.flash_error("Sorry, that user does not exist");
        return see_other("/campgrounds");
    };

    let campgrounds = CampgroundService::new(pool.get_ref().clone())
        .by_author(&user.id)
        .await
        .unwrap_or_else(|e| {
            log::error!("failed to load campgrounds for user {}: {}", user.id, e);
            Vec::new()
        });

    views::user_show(&PageContext::from_session(&session), &user, &campgrounds)
}

/// Shows the profile edit form; profile owner or admin only.
pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let id = path.into_inner();

    let user = match gate_user(&pool, &session, &id).await {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    views::user_edit(&PageContext::from_session(&session), &user)
}

/// Updates a profile; profile owner or admin only.
pub async fn update(
    pool: web::Data<PgPool>,
    session: SessionContext,
    path: web::Path<Uuid>,
    form: web::Form<UpdateProfileRequest>,
) -> HttpResponse {
    let id = path.into_inner();

    let user = match gate_user(&pool, &session, &id).await {
        Ok(user) => user,
        Err(denied) => return denied,
    };

    if let Err(e) = form.validate() {
        session.flash_error(e.to_string());
        return see_other(&format!("/users/{}/edit", user.id));
    }

    let auth = AuthService::new(pool.get_ref().clone());
    match auth.update_profile(&user.id, &form).await {
        Ok(updated) => {
            session.flash_success("Your profile was successfully updated!");
            see_other(&format!("/users/{}", updated.id))
        }
        Err(e) => {
            log::error!("failed to update profile {}: {}", user.id, e);
            session.flash_error("Something went wrong, please try again");
            see_other(&format!("/users/{}", user.id))
        }
    }
}

/// Looks up the user and runs the ownership gate (a user owns themselves).
async fn gate_user(
    pool: &web::Data<PgPool>,
    session: &SessionContext,
    id: &Uuid,
) -> Result<User, HttpResponse> {
    let auth = AuthService::new(pool.get_ref().clone());
    let found = match auth.get_user_by_id(id).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("failed to load user {}: {}", id, e);
            None
        }
    };

    let current = session.current_user();
    authorize(current.as_ref(), found, &GatePolicy::user(id))
        .map_err(|denied| denied.into_response(session))
}
