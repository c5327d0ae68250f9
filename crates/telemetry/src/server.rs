//! HTTP endpoint serving the metrics in the prometheus text format.

use std::error::Error;
use std::net::ToSocketAddrs;
use std::sync::Arc;

use prometheus::{Encoder, TextEncoder};
use rouille::{Request, Response, Server};

use crate::state::TelemetryState;

enum Route {
    Metrics,
    Other,
}

impl Route {
    fn from_request(request: &Request) -> Route {
        match (request.method(), request.url().as_str()) {
            ("GET", "/metrics") => Route::Metrics,
            _ => Route::Other,
        }
    }
}

/// Bind the metrics server to `address`, without serving requests yet.
pub fn listen(
    address: impl ToSocketAddrs,
    state: Arc<TelemetryState>,
) -> Result<Server<impl Fn(&Request) -> Response>, Box<dyn Error + Send + Sync>> {
    let server = Server::new(address, move |request| handle(request, &state))?;

    Ok(server)
}

fn handle(request: &Request, state: &TelemetryState) -> Response {
    match Route::from_request(request) {
        Route::Metrics => metrics(state),
        Route::Other => Response::empty_404(),
    }
}

fn metrics(state: &TelemetryState) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&state.gather(), &mut buffer) {
        Ok(()) => Response::from_data(encoder.format_type().to_string(), buffer),
        Err(e) => {
            tracing::error!("failed to encode metrics: {e}");
            Response::text(e.to_string()).with_status_code(500)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use std::io::Read;

    fn get(url: &str, state: &TelemetryState) -> (u16, String) {
        let request = Request::fake_http("GET", url, vec![], vec![]);
        let response = handle(&request, state);

        let mut body = String::new();
        let (mut reader, _) = response.data.into_reader_and_size();
        reader.read_to_string(&mut body).unwrap();

        (response.status_code, body)
    }

    #[test]
    fn serves_metrics() {
        let state = TelemetryState::new().unwrap();
        state.client_updated_now("ibc-0", "07-tendermint-0");

        let (status, body) = get("/metrics", &state);

        assert_eq!(status, 200);
        assert!(body.contains("last_client_update_time"));
        assert!(body.contains(r#"client_id="07-tendermint-0""#));
    }

    #[test]
    fn other_routes_are_not_found() {
        let state = TelemetryState::new().unwrap();

        let (status, body) = get("/status", &state);

        assert_eq!(status, 404);
        assert!(body.is_empty());
    }
}
