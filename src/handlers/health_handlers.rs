use actix_web::{HttpResponse, web};

use crate::state::app_state::AppState;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "backend": state.renderer.backend()
    }))
}
