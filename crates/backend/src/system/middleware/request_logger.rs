use axum::body::to_bytes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов
///
/// Пишет в лог метод, путь, статус, длительность и размер ответа.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                method = %method,
                path = uri.path(),
                status = parts.status.as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Failed to read response body: {}",
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    if parts.status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = uri.path(),
            status = parts.status.as_u16(),
            elapsed_ms,
            bytes = bytes.len(),
            "request"
        );
    } else {
        tracing::info!(
            method = %method,
            path = uri.path(),
            status = parts.status.as_u16(),
            elapsed_ms,
            bytes = bytes.len(),
            "request"
        );
    }

    // Создаем новый ответ с прочитанным телом
    Response::from_parts(parts, Body::from(bytes))
}
