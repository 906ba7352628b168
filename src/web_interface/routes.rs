use std::sync::Arc;

use futures_util::TryStreamExt;
use log::{debug, error, warn};
use warp::multipart::{FormData, Part};
use warp::{http::StatusCode, reply, Buf, Filter, Rejection, Reply};

use super::types::{GifListResponse, GifResponse, ListQuery, MessageResponse, UploadResponse};
use super::ApiError;
use crate::storage::store_trait::AssetStore;
use crate::storage::types::{NewGifAsset, Visibility};
use crate::upload::gateway_trait::UploadGateway;

/// Upload ceiling; a few minutes of webcam GIF stays well below this.
const MAX_UPLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// The full API: upload, listings, lookup, delete and the dashboard.
pub fn routes(
    store: Arc<dyn AssetStore>,
    gateway: Arc<dyn UploadGateway>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    dashboard_route()
        .or(upload_gif_route(store.clone(), gateway))
        .or(list_gifs_route(store.clone()))
        .or(get_gif_route(store.clone()))
        .or(delete_gif_route(store))
}

/// GET /
pub fn dashboard_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path::end().and(warp::get()).and_then(|| async move {
        let html = r#"<html><head><title>gifbooth</title></head>
                <body><h1>gifbooth is running</h1><p>See /gifs for the public gallery.</p></body></html>"#;
        Ok::<_, Rejection>(reply::html(html))
    })
}

/// POST /gifs
pub fn upload_gif_route(
    store: Arc<dyn AssetStore>,
    gateway: Arc<dyn UploadGateway>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("gifs")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and_then(move |form: FormData| {
            let store = store.clone();
            let gateway = gateway.clone();
            async move { Ok::<_, Rejection>(handle_upload(form, store, gateway).await) }
        })
}

/// GET /gifs — public gallery by default, `?all=true` for every row.
pub fn list_gifs_route(
    store: Arc<dyn AssetStore>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("gifs")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and_then(move |query: ListQuery| {
            let store = store.clone();
            async move {
                let include_private = matches!(query.all.as_deref(), Some("true") | Some("1"));
                let result = if include_private {
                    store.list_all().await
                } else {
                    store.list_public().await
                };
                match result {
                    Ok(gifs) => Ok::<_, Rejection>(
                        reply::with_status(
                            reply::json(&GifListResponse { gifs }),
                            StatusCode::OK,
                        )
                        .into_response(),
                    ),
                    Err(e) => {
                        error!("gallery listing failed: {}", e);
                        Ok::<_, Rejection>(error_reply(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Failed to fetch GIFs",
                        ))
                    }
                }
            }
        })
}

/// GET /gifs/:id — private assets are reachable here by direct link.
pub fn get_gif_route(
    store: Arc<dyn AssetStore>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("gifs" / i64)
        .and(warp::get())
        .and_then(move |id: i64| {
            let store = store.clone();
            async move {
                match store.get_by_id(id).await {
                    Ok(gif) => Ok::<_, Rejection>(
                        reply::with_status(reply::json(&GifResponse { gif }), StatusCode::OK)
                            .into_response(),
                    ),
                    Err(crate::error_handling::types::StorageError::NotFound) => {
                        Ok::<_, Rejection>(error_reply(StatusCode::NOT_FOUND, "GIF not found"))
                    }
                    Err(e) => {
                        error!("lookup of gif {} failed: {}", id, e);
                        Ok::<_, Rejection>(error_reply(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Failed to fetch GIF",
                        ))
                    }
                }
            }
        })
}

/// DELETE /gifs/:id
pub fn delete_gif_route(
    store: Arc<dyn AssetStore>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("gifs" / i64)
        .and(warp::delete())
        .and_then(move |id: i64| {
            let store = store.clone();
            async move {
                match store.delete_by_id(id).await {
                    Ok(()) => Ok::<_, Rejection>(
                        reply::with_status(
                            reply::json(&MessageResponse {
                                message: "GIF deleted".to_string(),
                            }),
                            StatusCode::OK,
                        )
                        .into_response(),
                    ),
                    Err(crate::error_handling::types::StorageError::NotFound) => {
                        Ok::<_, Rejection>(error_reply(StatusCode::NOT_FOUND, "GIF not found"))
                    }
                    Err(e) => {
                        error!("deletion of gif {} failed: {}", id, e);
                        Ok::<_, Rejection>(error_reply(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Failed to delete GIF",
                        ))
                    }
                }
            }
        })
}

fn error_reply(status: StatusCode, message: &str) -> reply::Response {
    reply::with_status(
        reply::json(&ApiError {
            error: message.to_string(),
        }),
        status,
    )
    .into_response()
}

struct UploadForm {
    /// Bytes and the client-provided filename of the `gif` part.
    file: Option<(Vec<u8>, String)>,
    is_public: bool,
}

async fn part_bytes(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, mut buf| async move {
            while buf.has_remaining() {
                let chunk = buf.chunk();
                acc.extend_from_slice(chunk);
                let n = chunk.len();
                buf.advance(n);
            }
            Ok(acc)
        })
        .await
}

async fn read_upload_form(mut form: FormData) -> Result<UploadForm, warp::Error> {
    let mut out = UploadForm {
        file: None,
        is_public: false,
    };
    while let Some(part) = form.try_next().await? {
        match part.name() {
            "gif" => {
                let hint = part.filename().unwrap_or_default().to_string();
                let bytes = part_bytes(part).await?;
                out.file = Some((bytes, hint));
            }
            "isPublic" => {
                let bytes = part_bytes(part).await?;
                let text = String::from_utf8_lossy(&bytes);
                out.is_public = matches!(text.trim(), "true" | "1");
            }
            _ => {}
        }
    }
    Ok(out)
}

async fn handle_upload(
    form: FormData,
    store: Arc<dyn AssetStore>,
    gateway: Arc<dyn UploadGateway>,
) -> reply::Response {
    let fields = match read_upload_form(form).await {
        Ok(fields) => fields,
        Err(e) => {
            debug!("rejecting malformed upload: {}", e);
            return error_reply(StatusCode::BAD_REQUEST, "Invalid upload payload");
        }
    };
    let Some((bytes, filename_hint)) = fields.file else {
        return error_reply(StatusCode::BAD_REQUEST, "No GIF file provided");
    };

    let receipt = match gateway.upload(&bytes, &filename_hint).await {
        Ok(receipt) => receipt,
        Err(e) => {
            error!("upload error: {}", e);
            return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Failed to upload GIF");
        }
    };

    let visibility = Visibility::from_public_flag(fields.is_public);
    let insert = store
        .insert(NewGifAsset {
            filename: receipt.filename.clone(),
            remote_url: receipt.remote_url.clone(),
            size_bytes: receipt.size_bytes,
            duration_ms: None,
            visibility,
        })
        .await;
    match insert {
        Ok(id) => reply::with_status(
            reply::json(&UploadResponse {
                id,
                url: receipt.remote_url,
                filename: receipt.filename,
                size: receipt.size_bytes,
                is_public: visibility.is_public(),
            }),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => {
            // No rollback: the remote object stays behind as an orphan.
            warn!(
                "remote object {} orphaned, local insert failed: {}",
                receipt.remote_url, e
            );
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save GIF")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_store::MemoryStore;
    use crate::upload::mock_gateway::MockUploadGateway;

    const BOUNDARY: &str = "gifbooth-test-boundary";

    fn multipart_body(file: Option<&[u8]>, is_public: Option<&str>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(bytes) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"gif\"; filename=\"clip.gif\"\r\nContent-Type: image/gif\r\n\r\n",
                    BOUNDARY
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(flag) = is_public {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"isPublic\"\r\n\r\n{}\r\n",
                    BOUNDARY, flag
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn api(
        store: Arc<MemoryStore>,
        gateway: Arc<MockUploadGateway>,
    ) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        routes(store, gateway)
    }

    macro_rules! post_gif {
        ($filter:expr, $file:expr, $is_public:expr) => {
            warp::test::request()
                .method("POST")
                .path("/gifs")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(multipart_body($file, $is_public))
                .reply($filter)
                .await
        };
    }

    #[tokio::test]
    async fn upload_persists_exactly_one_record() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store.clone(), gateway.clone());

        let payload = vec![0u8; 500_000];
        let resp = post_gif!(&filter, Some(payload.as_slice()), Some("true"));
        assert_eq!(resp.status(), StatusCode::OK);

        let body: UploadResponse = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body.size, 500_000);
        assert!(body.is_public);
        assert!(body.url.starts_with("https://"));

        assert_eq!(gateway.call_count(), 1);
        assert_eq!(gateway.recorded_calls()[0].0, 500_000);

        let stored = store.get_by_id(body.id).await.unwrap();
        assert_eq!(stored.size_bytes, 500_000);
        assert!(stored.visibility.is_public());

        // The new asset shows up in the public gallery.
        let resp = warp::test::request().path("/gifs").reply(&filter).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let listing: GifListResponse = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(listing.gifs.len(), 1);
        assert_eq!(listing.gifs[0].id, body.id);
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store, gateway.clone());

        let resp = post_gif!(&filter, None, Some("true"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ApiError = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body.error, "No GIF file provided");
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_upload_leaves_no_record() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::failing());
        let filter = api(store.clone(), gateway);

        let resp = post_gif!(&filter, Some(b"gifdata".as_slice()), None);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_flag_defaults_to_private() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store.clone(), gateway);

        let resp = post_gif!(&filter, Some(b"gifdata".as_slice()), None);
        assert_eq!(resp.status(), StatusCode::OK);
        let body: UploadResponse = serde_json::from_slice(resp.body()).unwrap();
        assert!(!body.is_public);

        // Private assets are absent from the gallery but reachable by link.
        let resp = warp::test::request().path("/gifs").reply(&filter).await;
        let listing: GifListResponse = serde_json::from_slice(resp.body()).unwrap();
        assert!(listing.gifs.is_empty());

        let resp = warp::test::request()
            .path(&format!("/gifs/{}", body.id))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched: GifResponse = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(fetched.gif.id, body.id);
    }

    #[tokio::test]
    async fn numeric_public_flag_is_accepted() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store, gateway);

        let resp = post_gif!(&filter, Some(b"gifdata".as_slice()), Some("1"));
        let body: UploadResponse = serde_json::from_slice(resp.body()).unwrap();
        assert!(body.is_public);
    }

    #[tokio::test]
    async fn admin_listing_includes_private_assets() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store, gateway);

        post_gif!(&filter, Some(b"public".as_slice()), Some("true"));
        post_gif!(&filter, Some(b"private".as_slice()), None);

        let resp = warp::test::request().path("/gifs").reply(&filter).await;
        let public: GifListResponse = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(public.gifs.len(), 1);

        let resp = warp::test::request()
            .path("/gifs?all=true")
            .reply(&filter)
            .await;
        let all: GifListResponse = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(all.gifs.len(), 2);
    }

    #[tokio::test]
    async fn unknown_id_is_404() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store, gateway);

        let resp = warp::test::request().path("/gifs/99").reply(&filter).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ApiError = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body.error, "GIF not found");
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store.clone(), gateway);

        let resp = post_gif!(&filter, Some(b"gifdata".as_slice()), Some("true"));
        let body: UploadResponse = serde_json::from_slice(resp.body()).unwrap();

        let resp = warp::test::request()
            .method("DELETE")
            .path(&format!("/gifs/{}", body.id))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let msg: MessageResponse = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(msg.message, "GIF deleted");

        let resp = warp::test::request()
            .method("DELETE")
            .path(&format!("/gifs/{}", body.id))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dashboard_serves_html() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockUploadGateway::new());
        let filter = api(store, gateway);

        let resp = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(String::from_utf8_lossy(resp.body()).contains("gifbooth"));
    }
}
