//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers only deal with domain-level
//! operations: who is signed in, and the read-once flash messages shown on
//! the next rendered page.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::types::{AuthError, SessionUser};

const USER_KEY: &str = "user";
const FLASH_KEY: &str = "flash";

/// Severity of a flash message; controls how the view styles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// Something went wrong; shown in the error banner.
    Error,
    /// An operation completed; shown in the success banner.
    Success,
}

/// A single-read notice carried in the session until the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Severity of the notice
    pub level: FlashLevel,
    /// Human-readable message shown once
    pub message: String,
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's snapshot in the session cookie.
    pub fn persist_user(&self, user: &SessionUser) -> Result<(), AuthError> {
        self.0
            .insert(USER_KEY, user)
            .map_err(|e| AuthError::Session(format!("failed to persist session: {e}")))
    }

    /// Fetch the signed-in user's snapshot, if any.
    ///
    /// An unreadable snapshot is treated as signed-out rather than an error,
    /// so a stale cookie never locks a browser out of public pages.
    pub fn current_user(&self) -> Option<SessionUser> {
        match self.0.get::<SessionUser>(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                log::warn!("invalid user snapshot in session cookie: {}", e);
                None
            }
        }
    }

    /// Drop the signed-in user, keeping any pending flash messages.
    pub fn forget_user(&self) {
        self.0.remove(USER_KEY);
    }

    /// Append a flash message to be shown on the next rendered page.
    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let mut pending = self.peek_flash();
        pending.push(Flash {
            level,
            message: message.into(),
        });
        if let Err(e) = self.0.insert(FLASH_KEY, &pending) {
            log::warn!("failed to store flash message: {}", e);
        }
    }

    /// Shorthand for an error-level flash.
    pub fn flash_error(&self, message: impl Into<String>) {
        self.flash(FlashLevel::Error, message);
    }

    /// Shorthand for a success-level flash.
    pub fn flash_success(&self, message: impl Into<String>) {
        self.flash(FlashLevel::Success, message);
    }

    /// Drain the pending flash messages. Read-once: a second call returns
    /// an empty list until something flashes again.
    pub fn take_flash(&self) -> Vec<Flash> {
        let pending = self.peek_flash();
        self.0.remove(FLASH_KEY);
        pending
    }

    fn peek_flash(&self) -> Vec<Flash> {
        self.0
            .get::<Vec<Flash>>(FLASH_KEY)
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use uuid::Uuid;

    fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
            .cookie_secure(false)
            .build()
    }

    fn fixture_user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            username: "blake".to_string(),
            avatar: "https://example.com/a.png".to_string(),
            is_admin: false,
        }
    }

    #[actix_web::test]
    async fn round_trips_signed_in_user() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session
                            .persist_user(&fixture_user())
                            .map(|_| HttpResponse::Ok().finish())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        match session.current_user() {
                            Some(user) => HttpResponse::Ok().body(user.username),
                            None => HttpResponse::Unauthorized().finish(),
                        }
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .next()
            .expect("session cookie set")
            .into_owned();

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, "blake");
    }

    #[actix_web::test]
    async fn flash_is_read_once() {
        let app = test::init_service(
            App::new().wrap(test_session_middleware()).route(
                "/roundtrip",
                web::get().to(|session: SessionContext| async move {
                    session.flash_error("first");
                    session.flash_success("second");
                    let drained = session.take_flash();
                    let again = session.take_flash();
                    HttpResponse::Ok().body(format!("{}/{}", drained.len(), again.len()))
                }),
            ),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/roundtrip").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, "2/0");
    }

    #[actix_web::test]
    async fn anonymous_session_has_no_user() {
        let app = test::init_service(App::new().wrap(test_session_middleware()).route(
            "/get",
            web::get().to(|session: SessionContext| async move {
                match session.current_user() {
                    Some(_) => HttpResponse::Ok().finish(),
                    None => HttpResponse::Unauthorized().finish(),
                }
            }),
        ))
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/get").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
