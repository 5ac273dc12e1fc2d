use actix_files::Files;
use actix_web::{HttpResponse, web};
use log::{error, info};
use serde::Serialize;
use uuid::Uuid;

use shared::{GhibliRequest, ProcessResponse, TransformRequest};

use crate::processing::service::ProcessingService;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/api/process-image").route(web::post().to(process_image)))
        .service(
            web::resource("/api/process-ghibli-image").route(web::post().to(process_ghibli_image)),
        )
        .service(web::resource("/api/images/{image_id}").route(web::get().to(get_image)))
        .service(Files::new("/static", frontend_dir));
}

// The processing endpoints always answer 200 with either the record
// or an {error} body; failures stay local to the one request.
async fn process_image(
    service: web::Data<ProcessingService>,
    request: web::Json<TransformRequest>,
) -> HttpResponse {
    match service.process_image(request.into_inner()).await {
        Ok(image) => HttpResponse::Ok().json(ProcessResponse::Success(image)),
        Err(e) => {
            error!("Processing error: {}", e);
            HttpResponse::Ok().json(ProcessResponse::failure(e.to_string()))
        }
    }
}

async fn process_ghibli_image(
    service: web::Data<ProcessingService>,
    request: web::Json<GhibliRequest>,
) -> HttpResponse {
    match service.process_ghibli(request.into_inner()).await {
        Ok(image) => HttpResponse::Ok().json(ProcessResponse::Success(image)),
        Err(e) => {
            error!("Processing error: {}", e);
            HttpResponse::Ok().json(ProcessResponse::failure(e.to_string()))
        }
    }
}

async fn get_image(service: web::Data<ProcessingService>, path: web::Path<String>) -> HttpResponse {
    let image_id_str = path.into_inner();
    let image_id = match Uuid::parse_str(&image_id_str) {
        Ok(uuid) => uuid,
        Err(_) => return HttpResponse::BadRequest().body("Invalid UUID format"),
    };
    match service.get_image(image_id).await {
        Ok(Some(image)) => {
            info!("Retrieved processed image: {}", image_id);
            HttpResponse::Ok().json(image)
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Image not found".into(),
        }),
        Err(e) => {
            error!("Error retrieving image {}: {}", image_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Error retrieving image".into(),
            })
        }
    }
}
