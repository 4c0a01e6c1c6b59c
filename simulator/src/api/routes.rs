use crate::api::model::{ErrorBody, RootMessage};
use crate::workflow::runner::Analyzer;
use anyhow::Context;
use doodlecore::UserPolygon;
use log::{info, warn};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter, Rejection, Reply,
};

const MAX_BODY_BYTES: u64 = 1024 * 1024;

fn error_reply(status: StatusCode, detail: impl Into<String>) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&ErrorBody::new(detail)), status)
}

fn with_analyzer(
    analyzer: Arc<Analyzer>,
) -> impl Filter<Extract = (Arc<Analyzer>,), Error = Infallible> + Clone {
    warp::any().map(move || analyzer.clone())
}

/// `GET /` and `POST /analyze`; every failure answers with a `detail` body.
pub fn routes(
    analyzer: Arc<Analyzer>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let root = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::json(&RootMessage::default()));

    let analyze = warp::path("analyze")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_analyzer(analyzer))
        .and_then(handle_analyze);

    root.or(analyze).recover(handle_rejection)
}

async fn handle_analyze(
    polygon: UserPolygon,
    analyzer: Arc<Analyzer>,
) -> Result<WithStatus<Json>, Infallible> {
    let latency = analyzer.config().latency();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    // Clipping is CPU bound; keep it off the reactor threads.
    let outcome = tokio::task::spawn_blocking(move || analyzer.execute(&polygon)).await;
    match outcome {
        Ok(Ok(response)) => Ok(warp::reply::with_status(
            warp::reply::json(&response),
            StatusCode::OK,
        )),
        Ok(Err(err)) => {
            warn!("analysis refused: {:?}", err);
            Ok(error_reply(StatusCode::BAD_REQUEST, err.to_string()))
        }
        Err(join_err) => {
            warn!("analysis task failed: {}", join_err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
            ))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<WithStatus<Json>, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not Found"));
    }
    if let Some(body_error) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, body_error.to_string()));
    }
    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    if err.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(error_reply(
            StatusCode::LENGTH_REQUIRED,
            "Content-Length header required",
        ));
    }
    if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(error_reply(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Request body must be application/json",
        ));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
        ));
    }
    warn!("unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
    ))
}

/// Serves the API on the configured address until `shutdown` resolves.
pub async fn serve(
    analyzer: Arc<Analyzer>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let bind = analyzer.config().bind;
    let (addr, server) = warp::serve(routes(analyzer))
        .try_bind_with_graceful_shutdown(bind, shutdown)
        .with_context(|| format!("binding analysis API to {}", bind))?;
    info!("analysis API listening on http://{}", addr);
    server.await;
    info!("analysis API stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::ServiceConfig;
    use doodlecore::backend::{interpret_reply, BackendReply};
    use doodlecore::contract::Position;
    use doodlecore::AnalysisError;
    use serde_json::json;

    fn block() -> UserPolygon {
        UserPolygon::new(vec![
            Position(-117.1610, 32.7190),
            Position(-117.1600, 32.7190),
            Position(-117.1600, 32.7198),
            Position(-117.1610, 32.7190),
        ])
        .unwrap()
    }

    fn analyzer(max_tiles: usize) -> Arc<Analyzer> {
        Arc::new(Analyzer::new(ServiceConfig {
            max_tiles,
            ..Default::default()
        }))
    }

    fn client_view(status: StatusCode, body: &[u8]) -> BackendReply {
        BackendReply::new(status.as_u16(), body.to_vec())
    }

    #[tokio::test]
    async fn analyze_replies_with_feature_collection() {
        let filter = routes(analyzer(50));
        let res = warp::test::request()
            .method("POST")
            .path("/analyze")
            .json(&block())
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let response = interpret_reply(&client_view(res.status(), res.body())).unwrap();
        assert!(!response.features.is_empty());
        assert!(response.metadata.total_area_sqft > 0.0);
    }

    #[tokio::test]
    async fn oversized_zone_yields_detail() {
        let filter = routes(analyzer(0));
        let res = warp::test::request()
            .method("POST")
            .path("/analyze")
            .json(&block())
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            interpret_reply(&client_view(res.status(), res.body())),
            Err(AnalysisError::Server(
                "Analysis zone too large, please draw a smaller area".into()
            ))
        );
    }

    async fn post_zone(target: Arc<Analyzer>, ring: Vec<Position>) -> BackendReply {
        let filter = routes(target);
        let res = warp::test::request()
            .method("POST")
            .path("/analyze")
            .json(&UserPolygon::new(ring).unwrap())
            .reply(&filter)
            .await;
        client_view(res.status(), res.body())
    }

    #[tokio::test]
    async fn continent_sized_zone_yields_detail() {
        let reply = post_zone(
            analyzer(50),
            vec![
                Position(-125.0, 25.0),
                Position(-67.0, 25.0),
                Position(-67.0, 49.0),
                Position(-125.0, 25.0),
            ],
        )
        .await;

        assert_eq!(reply.status, 400);
        assert_eq!(
            interpret_reply(&reply),
            Err(AnalysisError::Server(
                "Analysis zone too large, please draw a smaller area".into()
            ))
        );
    }

    #[tokio::test]
    async fn bowtie_zone_yields_detail() {
        let reply = post_zone(
            analyzer(50),
            vec![
                Position(-117.1610, 32.7190),
                Position(-117.1600, 32.7198),
                Position(-117.1600, 32.7190),
                Position(-117.1610, 32.7198),
                Position(-117.1610, 32.7190),
            ],
        )
        .await;

        assert_eq!(reply.status, 400);
        assert_eq!(
            interpret_reply(&reply),
            Err(AnalysisError::Server(
                "Analysis zone must not cross itself".into()
            ))
        );
    }

    #[tokio::test]
    async fn concurrent_analyses_both_complete() {
        let shared = analyzer(50);
        let (first, second) = tokio::join!(
            post_zone(shared.clone(), block().ring().to_vec()),
            post_zone(shared, block().ring().to_vec()),
        );
        assert_eq!(first.status, 200);
        assert_eq!(second.status, 200);
        let first = interpret_reply(&first).unwrap();
        let second = interpret_reply(&second).unwrap();
        assert_eq!(first.features, second.features);
    }

    #[tokio::test]
    async fn malformed_polygon_is_a_bad_request() {
        let filter = routes(analyzer(50));
        let res = warp::test::request()
            .method("POST")
            .path("/analyze")
            .json(&json!({
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
            }))
            .reply(&filter)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_slice(res.body()).unwrap();
        assert!(!body.detail.is_empty());
    }

    #[tokio::test]
    async fn root_describes_the_api() {
        let filter = routes(analyzer(50));
        let res = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: RootMessage = serde_json::from_slice(res.body()).unwrap();
        assert!(body.message.contains("POST /analyze"));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let filter = routes(analyzer(50));
        let res = warp::test::request().path("/tiles").reply(&filter).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
