//! Method override for HTML forms.
//!
//! Browsers only submit GET and POST, so edit and delete forms post to
//! `...?_method=PUT` / `...?_method=DELETE` and this middleware rewrites the
//! method before routing. Only POST may be overridden, and only to PUT or
//! DELETE.

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::Method;
use futures_util::future::{Ready, ready};

/// Middleware factory; wrap the whole app with it.
pub struct MethodOverride;

impl<S, B> Transform<S, ServiceRequest> for MethodOverride
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = MethodOverrideMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MethodOverrideMiddleware { service }))
    }
}

/// The wrapped service.
pub struct MethodOverrideMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for MethodOverrideMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if req.method() == Method::POST {
            if let Some(method) = override_from_query(req.query_string()) {
                req.head_mut().method = method;
            }
        }
        self.service.call(req)
    }
}

fn override_from_query(query: &str) -> Option<Method> {
    let raw = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("_method="))?;

    match raw.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[std::prelude::v1::test]
    fn test_override_from_query() {
        assert_eq!(override_from_query("_method=PUT"), Some(Method::PUT));
        assert_eq!(override_from_query("_method=delete"), Some(Method::DELETE));
        assert_eq!(override_from_query("a=1&_method=PUT"), Some(Method::PUT));
        assert_eq!(override_from_query("_method=PATCH"), None);
        assert_eq!(override_from_query(""), None);
        assert_eq!(override_from_query("search=tent"), None);
    }

    #[actix_web::test]
    async fn test_post_with_override_reaches_put_route() {
        let app = test::init_service(
            App::new()
                .wrap(MethodOverride)
                .route(
                    "/thing",
                    web::put().to(|| async { HttpResponse::Ok().body("put") }),
                )
                .route(
                    "/thing",
                    web::post().to(|| async { HttpResponse::Ok().body("post") }),
                ),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/thing?_method=PUT")
                .to_request(),
        )
        .await;
        let body = test::read_body(res).await;
        assert_eq!(body, "put");

        // A plain POST is left alone
        let res =
            test::call_service(&app, test::TestRequest::post().uri("/thing").to_request()).await;
        let body = test::read_body(res).await;
        assert_eq!(body, "post");
    }
}
