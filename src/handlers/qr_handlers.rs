use actix_web::{HttpRequest, HttpResponse, Responder, Result, http, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use nanoid::nanoid;
use validator::Validate;

use crate::models::content::QrContent;
use crate::render::drawing::Drawing;
use crate::render::normalize::ResolvedStyle;
use crate::render::{RenderError, Rendering, raster, svg};
use crate::state::app_state::AppState;
use crate::structs::qr_request::{PayloadResponse, RenderRequest, RenderResponse};
use crate::utils::digest::{etag, matches_etag};

fn render_error(e: RenderError) -> HttpResponse {
    match e {
        RenderError::DataTooLong => {
            log::warn!("rejected render: {}", e);
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
        other => {
            log::error!("QR render failed: {}", other);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("QR code generation error: {}", other)
            }))
        }
    }
}

/// Validate and render a request, or the response to send instead.
fn render_request(state: &AppState, req: &RenderRequest) -> Result<Rendering, HttpResponse> {
    if let Err(errors) = req.validate() {
        return Err(HttpResponse::BadRequest().json(errors));
    }
    state
        .renderer
        .resolve(&req.content(), &req.style_config())
        .map_err(render_error)
}

/// Rasterize off the async workers; the drawing is handed back for reuse.
async fn encode_png(drawing: Drawing) -> Result<(Drawing, Vec<u8>), HttpResponse> {
    match web::block(move || raster::to_png(&drawing).map(|png| (drawing, png))).await {
        Ok(Ok(encoded)) => Ok(encoded),
        Ok(Err(e)) => Err(render_error(e)),
        Err(e) => {
            log::error!("PNG encoding task failed: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "QR code generation error"
            })))
        }
    }
}

fn redirect(url: String) -> HttpResponse {
    HttpResponse::Found()
        .append_header((http::header::LOCATION, url))
        .finish()
}

fn not_modified(req: &HttpRequest, tag: &str) -> Option<HttpResponse> {
    let header = req.headers().get(http::header::IF_NONE_MATCH)?.to_str().ok()?;
    matches_etag(header, tag).then(|| {
        HttpResponse::NotModified()
            .append_header((http::header::ETAG, tag.to_string()))
            .finish()
    })
}

/// Render as SVG for the live preview
pub async fn preview_qr(
    app_state: web::Data<AppState>,
    http_req: HttpRequest,
    web::Json(req): web::Json<RenderRequest>,
) -> Result<impl Responder> {
    let drawing = match render_request(&app_state, &req) {
        Ok(Rendering::Drawing(drawing)) => drawing,
        Ok(Rendering::Remote { url }) => return Ok(redirect(url)),
        Err(response) => return Ok(response),
    };

    let body = svg::to_svg(&drawing);
    let tag = etag(body.as_bytes());
    if let Some(response) = not_modified(&http_req, &tag) {
        return Ok(response);
    }

    Ok(HttpResponse::Ok()
        .content_type("image/svg+xml")
        .append_header((http::header::ETAG, tag))
        .body(body))
}

/// Render as a PNG attachment
pub async fn download_qr(
    app_state: web::Data<AppState>,
    http_req: HttpRequest,
    web::Json(req): web::Json<RenderRequest>,
) -> Result<impl Responder> {
    let drawing = match render_request(&app_state, &req) {
        Ok(Rendering::Drawing(drawing)) => drawing,
        Ok(Rendering::Remote { url }) => return Ok(redirect(url)),
        Err(response) => return Ok(response),
    };

    let (_, png) = match encode_png(drawing).await {
        Ok(encoded) => encoded,
        Err(response) => return Ok(response),
    };
    let tag = etag(&png);
    if let Some(response) = not_modified(&http_req, &tag) {
        return Ok(response);
    }

    let name = req.name.clone().unwrap_or_else(|| nanoid!(8));
    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .append_header((
            http::header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"qrcode-{}.png\"", name),
        ))
        .append_header((http::header::ETAG, tag))
        .body(png))
}

/// Render both encodings into one JSON document
pub async fn render_qr(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<RenderRequest>,
) -> Result<impl Responder> {
    let backend = app_state.renderer.backend();
    let generated_at = chrono::Utc::now();

    let response = match render_request(&app_state, &req) {
        Ok(Rendering::Drawing(drawing)) => {
            let (drawing, png) = match encode_png(drawing).await {
                Ok(encoded) => encoded,
                Err(response) => return Ok(response),
            };
            RenderResponse::Local {
                backend,
                width: drawing.width,
                height: drawing.height,
                etag: etag(&png),
                svg: svg::to_svg(&drawing),
                png_base64: STANDARD.encode(&png),
                generated_at,
            }
        }
        Ok(Rendering::Remote { url }) => RenderResponse::Remote {
            backend,
            url,
            generated_at,
        },
        Err(response) => return Ok(response),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Fully populated default style
pub async fn get_defaults() -> HttpResponse {
    HttpResponse::Ok().json(ResolvedStyle::default().to_config())
}

/// Build the raw content string for a structured payload
pub async fn build_payload(web::Json(content): web::Json<QrContent>) -> HttpResponse {
    HttpResponse::Ok().json(PayloadResponse {
        content: content.to_payload(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use url::Url;

    use super::*;
    use crate::render::local::LocalRenderer;
    use crate::render::remote::RemoteRenderer;
    use crate::routes::init_routes;

    fn local_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(Arc::new(LocalRenderer)))
    }

    fn remote_state() -> web::Data<AppState> {
        let endpoint = Url::parse("https://qr.example.net/create").unwrap();
        web::Data::new(AppState::new(Arc::new(RemoteRenderer::new(endpoint))))
    }

    #[actix_web::test]
    async fn preview_returns_svg_with_etag() {
        let app = test::init_service(App::new().app_data(local_state()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/qr/preview")
            .set_json(json!({"content": "https://example.com", "style": {"dotStyle": "rounded"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
        let tag = resp.headers().get(http::header::ETAG).unwrap().to_str().unwrap().to_string();
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"<svg"));
        assert_eq!(tag, etag(&body));

        let req = test::TestRequest::post()
            .uri("/api/qr/preview")
            .insert_header((http::header::IF_NONE_MATCH, tag.clone()))
            .set_json(json!({"content": "https://example.com", "style": {"dotStyle": "rounded"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[actix_web::test]
    async fn download_sets_attachment_name() {
        let app = test::init_service(App::new().app_data(local_state()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/qr/download")
            .set_json(json!({"content": "hello", "name": "promo"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(http::header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(
            resp.headers().get(http::header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"qrcode-promo.png\""
        );
        let body = test::read_body(resp).await;
        let image = image::load_from_memory(&body).unwrap();
        assert_eq!((image.width(), image.height()), (200, 200));
    }

    #[actix_web::test]
    async fn download_generates_a_name() {
        let app = test::init_service(App::new().app_data(local_state()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/qr/download")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(http::header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        let name = disposition
            .strip_prefix("attachment; filename=\"qrcode-")
            .and_then(|rest| rest.strip_suffix(".png\""))
            .unwrap();
        assert_eq!(name.chars().count(), 8);
    }

    #[actix_web::test]
    async fn render_returns_both_encodings() {
        let app = test::init_service(App::new().app_data(local_state()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/qr/render")
            .set_json(json!({
                "payload": {"type": "wifi", "ssid": "Office", "password": "hunter2"},
                "config": {"size": "300", "body": "dots", "gradient": true, "gradientColors": ["#ff0000", "#0000ff"]}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["backend"], "local");
        assert_eq!(body["width"], 300);
        assert_eq!(body["height"], 300);
        assert!(body["svg"].as_str().unwrap().contains("dots-gradient"));
        let png = STANDARD.decode(body["png_base64"].as_str().unwrap()).unwrap();
        assert_eq!(body["etag"].as_str().unwrap(), etag(&png));
        assert!(body["generated_at"].is_string());
    }

    #[actix_web::test]
    async fn dense_code_on_small_canvas_grows_the_png() {
        let app = test::init_service(App::new().app_data(local_state()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/qr/render")
            .set_json(json!({
                "content": "https://example.com/".repeat(10),
                "style": {"size": 50}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        // version 10 is 57 modules, plus a 1px quiet zone each side
        assert_eq!(body["width"], 59);
        assert_eq!(body["height"], 59);
        let png = STANDARD.decode(body["png_base64"].as_str().unwrap()).unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (59, 59));
        assert!(body["svg"].as_str().unwrap().contains("width=\"59\""));
    }

    #[actix_web::test]
    async fn validation_and_capacity_errors() {
        let app = test::init_service(App::new().app_data(local_state()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/qr/preview")
            .set_json(json!({"content": "x".repeat(5000)}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/qr/download")
            .set_json(json!({"content": "ok", "name": "../evil"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // within the request limit but beyond what a QR code holds at level H
        let req = test::TestRequest::post()
            .uri("/api/qr/render")
            .set_json(json!({"content": "x".repeat(2000), "style": {"errorCorrectionLevel": "H"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("too long"));
    }

    #[actix_web::test]
    async fn remote_backend_redirects() {
        let app = test::init_service(App::new().app_data(remote_state()).configure(init_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/qr/preview")
            .set_json(json!({"content": "hello", "style": {"size": 250}}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers().get(http::header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("https://qr.example.net/create?data=hello&size=250x250"));

        let req = test::TestRequest::post()
            .uri("/api/qr/render")
            .set_json(json!({"content": "hello"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["backend"], "remote");
        assert!(body["url"].as_str().unwrap().contains("data=hello"));
        assert!(body.get("svg").is_none());
    }

    #[actix_web::test]
    async fn defaults_and_payload_endpoints() {
        let app = test::init_service(App::new().app_data(local_state()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/api/qr/defaults").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["size"], 200.0);
        assert_eq!(body["foreground"], "#000000");
        assert_eq!(body["errorCorrectionLevel"], "M");
        assert_eq!(body["dotStyle"], "square");

        let req = test::TestRequest::post()
            .uri("/api/qr/payload")
            .set_json(json!({"type": "sms", "phone": "+15550100", "body": "hi there"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["content"], "sms:+15550100?body=hi%20there");
    }
}
