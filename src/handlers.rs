use std::sync::Arc;

use axum::{
    body::Body,
    extract::{MatchedPath, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use http::Request;
use tower_http::trace::TraceLayer;

use crate::{
    requests::{AccessLinkPathParam, RedeemQuery},
    responses::Redirection,
    service::AccessLinkId,
    Services,
};

pub fn router(services: Arc<Services>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/_s/:access_link_id", get(redeem_access_link))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(services)
}

// The raw URI carries the access link id, so only the route pattern is recorded.
fn request_span(request: &Request<Body>) -> tracing::Span {
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str);

    tracing::info_span!("http_request", method = %request.method(), matched_path)
}

async fn health() -> &'static str {
    "ok"
}

async fn redeem_access_link(
    State(services): State<Arc<Services>>,
    Path(AccessLinkPathParam { access_link_id }): Path<AccessLinkPathParam>,
    Query(query): Query<RedeemQuery>,
) -> Result<Redirection, Response> {
    let id = AccessLinkId::try_from(access_link_id)?;

    Ok(services
        .redeemer
        .redeem(&id, query.redirect_to.as_deref())
        .await)
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Mutex, time::Duration};

    use http::{header, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        backend::{AccessLinkBackend, GraphqlBackend},
        cookies::{toast_cookie, ToastKind},
        service::{
            tests::{settings, FakeBackend},
            RedeemService,
        },
    };

    fn app(backend: Arc<dyn AccessLinkBackend>) -> Router {
        router(Arc::new(Services {
            redeemer: RedeemService::new(backend, settings()),
        }))
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    async fn get_response(app: Router, uri: &str) -> Response {
        app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = get_response(app(Arc::new(FakeBackend::accepting())), "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn redeems_and_follows_encoded_redirect_target() {
        let backend = Arc::new(FakeBackend::accepting());

        let response = get_response(
            app(backend.clone()),
            "/_s/acl_01HX?redirectTo=%2Fcollections%2F4%3Ftab%3Ditems",
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/collections/4?tab=items");
        assert!(cookies(&response)[0].starts_with("auth=key-123; "));
        assert_eq!(*backend.calls.lock().unwrap(), vec!["acl_01HX".to_string()]);
    }

    #[tokio::test]
    async fn cross_origin_target_falls_back_to_landing() {
        let response = get_response(
            app(Arc::new(FakeBackend::accepting())),
            "/_s/acl_01HX?redirectTo=https%3A%2F%2Fevil.example%2Fphish",
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn rejection_redirects_to_auth_with_toast() {
        let response =
            get_response(app(Arc::new(FakeBackend::rejecting())), "/_s/acl_01HX").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/auth");
        let cookies = cookies(&response);
        assert!(cookies[0].starts_with("auth=; "));
        assert!(cookies[1].starts_with("toast="));
    }

    #[tokio::test]
    async fn backend_failure_never_surfaces_as_server_error() {
        let response =
            get_response(app(Arc::new(FakeBackend::without_data())), "/_s/acl_01HX").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/auth");
    }

    #[tokio::test]
    async fn blank_id_fails_before_backend_call() {
        let backend = Arc::new(FakeBackend::accepting());

        let response = get_response(app(backend.clone()), "/_s/%20%20").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn connection_failure_redirects_to_auth_with_generic_toast() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend =
            GraphqlBackend::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();

        let response = get_response(app(Arc::new(backend)), "/_s/acl_01HX").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/auth");
        assert_eq!(
            cookies(&response)[1],
            toast_cookie(
                ToastKind::Error,
                "Could not process the access link, please try again",
                true
            )
        );
    }

    #[tokio::test]
    async fn request_logs_record_route_pattern_not_access_link_id() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = get_response(
            app(Arc::new(FakeBackend::accepting())),
            "/_s/acl_secret_42?redirectTo=%2Fcollections",
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let output = logs.contents();
        assert!(output.contains("/_s/:access_link_id"), "{output}");
        assert!(!output.contains("acl_secret_42"), "{output}");
    }
}
