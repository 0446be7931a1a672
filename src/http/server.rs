// A deliberately vulnerable service for trying the attack against.
//
// `GET /convert` reads a hex ciphertext from the `vals` cookie, decrypts it
// and tells the caller whether the padding was broken.
use crate::CbcPaddingOracle;

use axum::{
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::{TcpListener, ToSocketAddrs};

use std::sync::Arc;

use super::{DEFAULT_COOKIE_NAME, DEFAULT_INVALID_MARKER};

/// Bind `address` and serve the vulnerable endpoint in the background.
/// Returns the base URL of the server.
pub async fn spawn_server(
    address: impl ToSocketAddrs,
    request_handler: &PaddingOracleRequestHandler,
) -> std::io::Result<String> {
    let app = router(request_handler);
    let listener = TcpListener::bind(address).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("oracle server stopped: {e}");
        }
    });
    Ok(format!("http://{}", addr))
}

pub fn router(request_handler: &PaddingOracleRequestHandler) -> Router {
    let handler = Arc::new(request_handler.clone());
    Router::new().route(
        "/convert",
        get(move |headers: HeaderMap| {
            let handler = handler.clone();
            async move { handler.handle_request(&headers) }
        }),
    )
}

#[derive(Clone)]
pub struct PaddingOracleRequestHandler {
    oracle: CbcPaddingOracle,
}

impl PaddingOracleRequestHandler {
    pub fn new(oracle: CbcPaddingOracle) -> Self {
        Self { oracle }
    }

    pub fn handle_request(&self, headers: &HeaderMap) -> axum::response::Response {
        let ciphertext = match cookie_value(headers, DEFAULT_COOKIE_NAME) {
            Some(c) => c,
            None => {
                return (StatusCode::BAD_REQUEST, "Missing 'vals' cookie").into_response();
            }
        };
        if hex::decode(&ciphertext).is_err() {
            return (StatusCode::BAD_REQUEST, "Illegal 'vals' cookie").into_response();
        }

        match self.oracle.decrypt(&ciphertext) {
            Some(_) => (StatusCode::OK, "Conversion complete.").into_response(),
            None => (StatusCode::OK, DEFAULT_INVALID_MARKER).into_response(),
        }
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
