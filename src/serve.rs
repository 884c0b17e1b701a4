//! HTTP boundary: a small `axum` router mapping slippy-map tile URLs onto a
//! [`TileSource`].

use axum::extract::{Path, State};
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::render::TileOutcome;
use crate::source::TrackSource;
use crate::TileSource;

/// Content type served with tile payloads.
pub const MVT_CONTENT_TYPE: &str = "application/vnd.mapbox-vector-tile";

#[derive(Clone)]
pub struct Config {
    pub cors: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub source: TrackSource,
}

impl Config {
    /// Builds the tile router: `/:z/:x/:y` for tiles plus a `/` health
    /// route, with request tracing and (optionally) a permissive CORS layer.
    pub fn build_router(&self, pool: SqlitePool, source: TrackSource) -> Router {
        let mut router = Router::new()
            .route("/", get(health))
            .route("/:z/:x/:y", get(serve_tile));

        if self.cors {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any);

            router = router.layer(cors);
        }

        router
            .layer(TraceLayer::new_for_http())
            .with_state(AppState { pool, source })
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn serve_tile(
    State(AppState { pool, source }): State<AppState>,
    Path((z, x, y)): Path<(u8, u32, u32)>,
) -> impl IntoResponse {
    match source.render_mvt(&pool, z, x, y).await {
        Ok(TileOutcome::Bytes(bytes)) => {
            ([(header::CONTENT_TYPE, MVT_CONTENT_TYPE)], bytes).into_response()
        }
        Ok(TileOutcome::Empty) => StatusCode::NO_CONTENT.into_response(),
        Err(err @ Error::InvalidTileCoord { .. }) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => {
            tracing::error!("error rendering tile: {:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
