use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs method, path and status. The query string is left out since it
/// carries signatures.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!("{} {} -> {}", method, path, response.status());
    response
}
