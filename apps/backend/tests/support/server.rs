// Real server for WebSocket tests

use std::net::TcpListener;

use actix_web::{web, App, HttpServer};
use orchestrator::middleware::request_trace::RequestTrace;
use orchestrator::middleware::structured_logger::StructuredLogger;
use orchestrator::middleware::trace_span::TraceSpan;
use orchestrator::routes;
use orchestrator::AppState;

/// Binds a random local port and serves every route.
///
/// Returns the handle to stop the server and the bound address.
pub fn start_test_server(
    state: AppState,
) -> Result<(actix_web::dev::ServerHandle, std::net::SocketAddr), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((handle, addr))
}
