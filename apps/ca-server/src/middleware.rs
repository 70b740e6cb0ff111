use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::metrics::track_request_count_and_time;

pub(crate) struct HttpRequestContext<'a> {
    pub path: &'a str,
    pub method: &'a str,
}

pub(crate) fn get_http_request_context<T>(request: &Request<T>) -> HttpRequestContext<'_> {
    HttpRequestContext {
        path: request.uri().path(),
        method: request.method().as_str(),
    }
}

pub(crate) async fn metrics_counter(request: Request<Body>, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let start = Instant::now();
    let response = next.run(request).await;
    track_request_count_and_time(&route, start.elapsed().as_secs_f64());

    response
}
