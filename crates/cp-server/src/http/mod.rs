//! HTTP transport.
//!
//! | Method | Path       | Body                          |
//! |--------|------------|-------------------------------|
//! | GET    | `/`        |                               |
//! | GET    | `/status`  |                               |
//! | PUT    | `/cars`    | JSON `[{"id":1,"seats":4}]`   |
//! | POST   | `/group`   |                               |
//! | POST   | `/journey` | form `gid`, `seats`           |
//! | POST   | `/locate`  | form `gid`                    |
//! | POST   | `/dropoff` | form `gid`                    |

pub mod handlers;
pub mod response;

use std::future::Future;

use axum::Router;
use axum::routing::{get, post, put};
use cp_core::SharedDispatcher;
use tokio::net::TcpListener;

pub fn router(dispatcher: SharedDispatcher) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/status", get(handlers::status))
        .route("/cars", put(handlers::load_cars))
        .route("/group", post(handlers::register_group))
        .route("/journey", post(handlers::start_journey))
        .route("/locate", post(handlers::locate))
        .route("/dropoff", post(handlers::drop_off))
        .fallback(handlers::unknown_route)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(dispatcher)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    dispatcher: SharedDispatcher,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown)
        .await
}
