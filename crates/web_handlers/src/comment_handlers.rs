use actix_web::{HttpRequest, HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use auth_services::session::SessionContext;

use crate::campground_service::CampgroundService;
use crate::comment_service::CommentService;
use crate::ownership::{GatePolicy, authorize, back_url, require_login, see_other};
use crate::types::{Comment, CommentForm};

/// Creates a comment against an existing campground.
///
/// Two independent writes: the comment row first, then the reference appended
/// to the campground. There is no transaction spanning them; a failure after
/// the first write leaves an unreferenced comment row behind.
pub async fn create(
    pool: web::Data<PgPool>,
    session: SessionContext,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> HttpResponse {
    let campground_id = path.into_inner();

    let current = session.current_user();
    let actor = match require_login(current.as_ref()) {
        Ok(actor) => actor,
        Err(denied) => return denied.into_response(&session),
    };

    if let Err(e) = form.validate() {
        session.flash_error(e.to_string());
        return see_other(&format!("/campgrounds/{campground_id}"));
    }

    let campgrounds = CampgroundService::new(pool.get_ref().clone());
    let campground = match campgrounds.find(&campground_id).await {
        Ok(Some(campground)) => campground,
        Ok(None) | Err(_) => {
            session.flash_error("Something went wrong");
            return see_other("/campgrounds");
        }
    };

    let comments = CommentService::new(pool.get_ref().clone());
    let created = match comments.create(form.body.trim(), actor).await {
        Ok(created) => created,
        Err(e) => {
            log::error!("failed to persist comment: {}", e);
            session.flash_error("Something went wrong");
            return see_other("/campgrounds");
        }
    };

    if let Err(e) = campgrounds
        .push_comment_ref(&campground.id, &created.id)
        .await
    {
        log::error!(
            "comment {} created but not referenced by campground {}: {}",
            created.id,
            campground.id,
            e
        );
        session.flash_error("Something went wrong");
        return see_other("/campgrounds");
    }

    see_other(&format!("/campgrounds/{}#comments", campground.id))
}

/// Replaces a comment's body; comment owner or admin only.
pub async fn update(
    pool: web::Data<PgPool>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<CommentForm>,
) -> HttpResponse {
    let (campground_id, comment_id) = path.into_inner();

    let comment = match gate_comment(&pool, &session, &campground_id, &comment_id).await {
        Ok(comment) => comment,
        Err(denied) => return denied,
    };

    if let Err(e) = form.validate() {
        session.flash_error(e.to_string());
        return see_other(&format!("/campgrounds/{campground_id}"));
    }

    let service = CommentService::new(pool.get_ref().clone());
    match service.update(&comment.id, form.body.trim()).await {
        Ok(()) => see_other(&format!("/campgrounds/{campground_id}#comments")),
        Err(e) => {
            log::error!("failed to update comment {}: {}", comment.id, e);
            see_other(&back_url(&req, "/campgrounds"))
        }
    }
}

/// Hard-deletes a comment; comment owner or admin only.
///
/// The campground's comment_ids keeps the dangling reference; see
/// `CommentService::delete`.
pub async fn delete(
    pool: web::Data<PgPool>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> HttpResponse {
    let (campground_id, comment_id) = path.into_inner();

    let comment = match gate_comment(&pool, &session, &campground_id, &comment_id).await {
        Ok(comment) => comment,
        Err(denied) => return denied,
    };

    let service = CommentService::new(pool.get_ref().clone());
    match service.delete(&comment.id).await {
        Ok(()) => {
            session.flash_success("Comment successfully deleted");
            see_other(&format!("/campgrounds/{campground_id}"))
        }
        Err(e) => {
            log::error!("failed to delete comment {}: {}", comment.id, e);
            see_other(&back_url(&req, "/campgrounds"))
        }
    }
}

/// Looks up the comment and runs the ownership gate.
async fn gate_comment(
    pool: &web::Data<PgPool>,
    session: &SessionContext,
    campground_id: &Uuid,
    comment_id: &Uuid,
) -> Result<Comment, HttpResponse> {
    let service = CommentService::new(pool.get_ref().clone());
    let found = match service.find(comment_id).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("failed to load comment {}: {}", comment_id, e);
            None
        }
    };

    let current = session.current_user();
    authorize(current.as_ref(), found, &GatePolicy::comment(campground_id))
        .map_err(|denied| denied.into_response(session))
}
