use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;

use auth_services::session::SessionContext;
use media_services::MediaService;

use crate::campground_service::CampgroundService;
use crate::comment_service::CommentService;
use crate::ownership::{GatePolicy, authorize, back_url, require_login, see_other};
use crate::types::{Campground, CampgroundUpload, SearchQuery};
use crate::views::{self, PageContext};

const NO_MATCH: &str = "No campgrounds match that query, please try again.";

/// Lists all campgrounds, optionally filtered by a fuzzy name search.
///
/// A storage failure degrades to an empty list with an error flash; the
/// index never surfaces a bare error page.
pub async fn index(
    pool: web::Data<PgPool>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    let service = CampgroundService::new(pool.get_ref().clone());
    let search = query.search.as_deref();
    let campgrounds = match service.list(search).await {
        Ok(campgrounds) => campgrounds,
        Err(e) => {
            log::error!("failed to list campgrounds: {}", e);
            session.flash_error("Something went wrong");
            return views::campground_index(&PageContext::from_session(&session), &[], search, None);
        }
    };

    let searched = search.map(str::trim).is_some_and(|q| !q.is_empty());
    let no_match = (searched && campgrounds.is_empty()).then_some(NO_MATCH);

    views::campground_index(
        &PageContext::from_session(&session),
        &campgrounds,
        search,
        no_match,
    )
}

/// Shows the new-campground form.
pub async fn new_form(session: SessionContext) -> HttpResponse {
    if let Err(denied) = require_login(session.current_user().as_ref()) {
        return denied.into_response(&session);
    }

    views::campground_form(
        &PageContext::from_session(&session),
        "Create new campground",
        "/campgrounds",
        None,
    )
}

/// Creates a campground: the image is uploaded to the media host first, and
/// the record is only persisted once the upload succeeded. Any failure sends
/// the actor back with the error flashed; no partial record is committed.
pub async fn create(
    pool: web::Data<PgPool>,
    media: web::Data<MediaService>,
    session: SessionContext,
    req: HttpRequest,
    MultipartForm(form): MultipartForm<CampgroundUpload>,
) -> HttpResponse {
    let current = session.current_user();
    let actor = match require_login(current.as_ref()) {
        Ok(actor) => actor,
        Err(denied) => return denied.into_response(&session),
    };
    let back = back_url(&req, "/campgrounds");

    let Some(price) = parse_price(&form.price) else {
        session.flash_error("Price must be a number.");
        return see_other(&back);
    };
    let Some(image) = form.image else {
        session.flash_error("Please attach an image file.");
        return see_other(&back);
    };
    let filename = image.file_name.clone().unwrap_or_default();
    if !is_image_filename(&filename) {
        session.flash_error("Only image files are allowed!");
        return see_other(&back);
    }

    let uploaded = match media.upload(image.data.to_vec(), &filename).await {
        Ok(uploaded) => uploaded,
        Err(e) => {
            session.flash_error(e.to_string());
            return see_other(&back);
        }
    };

    let service = CampgroundService::new(pool.get_ref().clone());
    match service
        .create(
            form.name.trim(),
            price,
            form.description.trim(),
            &uploaded,
            actor,
        )
        .await
    {
        Ok(campground) => see_other(&format!("/campgrounds/{}", campground.id)),
        Err(e) => {
            log::error!("failed to persist campground: {}", e);
            session.flash_error(e.to_string());
            see_other(&back)
        }
    }
}

/// Shows one campground with its comments. Public read, no gate.
///
/// A failing comment fetch degrades to an empty comment list; the page
/// itself never surfaces a bare error page.
pub async fn show(
    pool: web::Data<PgPool>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let found = match service.find(&id).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("failed to load campground {}: {}", id, e);
            None
        }
    };

    let Some(campground) = found else {
        session.flash_error("Sorry, that campground does not exist!");
        return see_other("/campgrounds");
    };

    let comments = CommentService::new(pool.get_ref().clone())
        .find_referenced(&campground.comment_ids)
        .await
        .unwrap_or_else(|e| {
            log::error!("failed to load comments for campground {}: {}", id, e);
            Vec::new()
        });

    views::campground_show(
        &PageContext::from_session(&session),
        &campground,
        &comments,
    )
}

/// Shows the edit form; owner or admin only.
pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let id = path.into_inner();
    let back = back_url(&req, "/campgrounds");

    let campground = match gate_campground(&pool, &session, &id, &back).await {
        Ok(campground) => campground,
        Err(denied) => return denied,
    };

    views::campground_form(
        &PageContext::from_session(&session),
        &format!("Edit {}", campground.name),
        &format!("/campgrounds/{}?_method=PUT", campground.id),
        Some(&campground),
    )
}

/// Updates a campground; owner or admin only.
///
/// When a replacement image is attached the old remote asset is destroyed
/// before the new one is uploaded. The two steps are not atomic: a failure in
/// between leaves the campground pointing at the already-destroyed asset
/// until a retry succeeds.
pub async fn update(
    pool: web::Data<PgPool>,
    media: web::Data<MediaService>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<CampgroundUpload>,
) -> HttpResponse {
    let id = path.into_inner();
    let back = back_url(&req, "/campgrounds");

    let campground = match gate_campground(&pool, &session, &id, &back).await {
        Ok(campground) => campground,
        Err(denied) => return denied,
    };

    let Some(price) = parse_price(&form.price) else {
        session.flash_error("Price must be a number.");
        return see_other(&back);
    };

    let service = CampgroundService::new(pool.get_ref().clone());

    if let Some(image) = form.image {
        let filename = image.file_name.clone().unwrap_or_default();
        if !is_image_filename(&filename) {
            session.flash_error("Only image files are allowed!");
            return see_other(&back);
        }

        if let Err(e) = media.destroy(&campground.image_id).await {
            session.flash_error(e.to_string());
            return see_other(&back);
        }
        let uploaded = match media.upload(image.data.to_vec(), &filename).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                session.flash_error(e.to_string());
                return see_other(&back);
            }
        };
        if let Err(e) = service.set_image(&id, &uploaded).await {
            session.flash_error(e.to_string());
            return see_other(&back);
        }
    }

    match service
        .update_details(&id, form.name.trim(), price, form.description.trim())
        .await
    {
        Ok(()) => {
            session.flash_success("Successfully Updated!");
            see_other(&format!("/campgrounds/{id}"))
        }
        Err(e) => {
            session.flash_error(e.to_string());
            see_other(&back)
        }
    }
}

/// Deletes a campground; owner or admin only. The hosted image is released
/// best-effort: the deletion handle is handed to the media host exactly
/// once, and a failure is only logged.
pub async fn delete(
    pool: web::Data<PgPool>,
    media: web::Data<MediaService>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let id = path.into_inner();
    let back = back_url(&req, "/campgrounds");

    let campground = match gate_campground(&pool, &session, &id, &back).await {
        Ok(campground) => campground,
        Err(denied) => return denied,
    };

    let service = CampgroundService::new(pool.get_ref().clone());
    if let Err(e) = service.delete(&id).await {
        session.flash_error(e.to_string());
        return see_other(&back);
    }

    if let Err(e) = media.destroy(&campground.image_id).await {
        log::warn!("failed to release image {}: {}", campground.image_id, e);
    }

    session.flash_success("Campground deleted successfully!");
    see_other("/campgrounds")
}

/// Looks up the campground and runs the ownership gate; returns the resource
/// on success or the ready-made deny response.
async fn gate_campground(
    pool: &web::Data<PgPool>,
    session: &SessionContext,
    id: &Uuid,
    back: &str,
) -> Result<Campground, HttpResponse> {
    let service = CampgroundService::new(pool.get_ref().clone());
    let found = match service.find(id).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("failed to load campground {}: {}", id, e);
            None
        }
    };

    let current = session.current_user();
    authorize(current.as_ref(), found, &GatePolicy::campground(back))
        .map_err(|denied| denied.into_response(session))
}

/// Parses the submitted price; a negative or non-numeric value is rejected
/// at the handler so it flashes like any other validation failure.
fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|price| *price >= 0.0)
}

fn is_image_filename(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "gif"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    #[std::prelude::v1::test]
    fn test_is_image_filename() {
        assert!(is_image_filename("tent.jpg"));
        assert!(is_image_filename("SITE.JPEG"));
        assert!(is_image_filename("fire.png"));
        assert!(is_image_filename("river.gif"));
        assert!(!is_image_filename("notes.txt"));
        assert!(!is_image_filename("archive.tar.gz"));
        assert!(!is_image_filename(""));
        assert!(!is_image_filename("jpg"));
    }

    #[std::prelude::v1::test]
    fn test_parse_price() {
        assert_eq!(parse_price("12.50"), Some(12.5));
        assert_eq!(parse_price(" 9 "), Some(9.0));
        assert_eq!(parse_price("0"), Some(0.0));
        assert_eq!(parse_price("-3"), None);
        assert_eq!(parse_price("ten"), None);
        assert_eq!(parse_price(""), None);
    }

    #[actix_web::test]
    async fn index_degrades_when_storage_is_unreachable() {
        // Lazy pool pointing nowhere: the first query fails, not construction
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(1))
            .connect_lazy("postgres://127.0.0.1:1/unreachable")
            .expect("lazy pool");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .route("/campgrounds", web::get().to(index)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/campgrounds").to_request(),
        )
        .await;

        // Degrades to an empty index with an error flash, never a bare 500
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Something went wrong"));
    }
}
