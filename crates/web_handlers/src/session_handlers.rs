use actix_web::{HttpResponse, Result, web};
use sqlx::PgPool;
use validator::Validate;

use auth_services::service::{AuthService, admin_code_matches};
use auth_services::session::SessionContext;
use auth_services::types::{AuthError, LoginRequest, RegisterRequest, SessionUser};

use crate::ownership::see_other;
use crate::types::{AppSettings, RegisterForm, WebError};
use crate::views::{self, PageContext};

/// Landing page.
pub async fn landing(session: SessionContext) -> HttpResponse {
    views::landing(&PageContext::from_session(&session))
}

/// Shows the registration form.
pub async fn register_form(session: SessionContext) -> HttpResponse {
    views::register_form(&PageContext::from_session(&session), "")
}

/// Handles sign-up: the admin flag is granted only when the submitted code
/// matches the configured secret, compared in constant time. On failure the
/// account service's message is flashed verbatim and the form is shown
/// again with the attempted username kept.
pub async fn register(
    pool: web::Data<PgPool>,
    settings: web::Data<AppSettings>,
    session: SessionContext,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, WebError> {
    if let Err(e) = form.validate() {
        session.flash_error(e.to_string());
        return Ok(views::register_form(
            &PageContext::from_session(&session),
            &form.username,
        ));
    }

    let form = form.into_inner();
    let is_admin = admin_code_matches(&form.admin_code, &settings.admin_code);
    let request = RegisterRequest {
        username: form.username,
        password: form.password,
        avatar: form.avatar,
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        description: form.description,
    };

    let auth = AuthService::new(pool.get_ref().clone());
    let user = match auth.register(&request, is_admin).await {
        Ok(user) => user,
        Err(e) => {
            session.flash_error(e.to_string());
            return Ok(views::register_form(
                &PageContext::from_session(&session),
                &request.username,
            ));
        }
    };

    session
        .persist_user(&SessionUser::from(&user))
        .map_err(WebError::Auth)?;
    session.flash_success(format!("Welcome to YonderCamp {}!", user.username));
    Ok(see_other("/campgrounds"))
}

/// Shows the login form.
pub async fn login_form(session: SessionContext) -> HttpResponse {
    views::login_form(&PageContext::from_session(&session))
}

/// Verifies credentials and establishes the session.
pub async fn login(
    pool: web::Data<PgPool>,
    session: SessionContext,
    form: web::Form<LoginRequest>,
) -> Result<HttpResponse, WebError> {
    let auth = AuthService::new(pool.get_ref().clone());

    let user = match auth.verify_password(&form.username, &form.password).await {
        Ok(user) => user,
        Err(e @ (AuthError::InvalidCredentials | AuthError::UserNotFound)) => {
            session.flash_error(e.to_string());
            return Ok(see_other("/login"));
        }
        Err(e) => {
            log::error!("login failed for {}: {}", form.username, e);
            session.flash_error("Something went wrong, please try again");
            return Ok(see_other("/login"));
        }
    };

    session
        .persist_user(&SessionUser::from(&user))
        .map_err(WebError::Auth)?;
    Ok(see_other("/campgrounds"))
}

/// Tears down the session.
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.forget_user();
    session.flash_success("Logged you out!");
    see_other("/campgrounds")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn failed_registration_keeps_the_attempted_username() {
        // Never reaches the database: validation fails first
        let pool = sqlx::PgPool::connect_lazy("postgres://127.0.0.1:1/unreachable")
            .expect("lazy pool");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(AppSettings {
                    admin_code: "secret".to_string(),
                }))
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .route("/register", web::post().to(register)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_form([("username", "sam"), ("password", "")])
                .to_request(),
        )
        .await;

        // The form is rendered again with the username kept and the error flashed
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains(r#"value="sam""#));
        assert!(html.contains("Password is required"));
    }
}
