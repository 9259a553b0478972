use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassService;
use crate::{
    middlewares::Validate,
    models::classes::{
        entities::RequiredField, requests::CreateClassRequest, responses::ClassResponse,
    },
    utils::validate::validate_field_name,
};

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let auth = match Validate::extract_auth(request) {
        Some(auth) => auth,
        None => {
            return Ok(HttpResponse::Unauthorized().json("Unauthorized: missing user claims"));
        }
    };

    let name = match class_data.name.as_deref().filter(|s| !s.is_empty()) {
        Some(name) => name,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [name]"));
        }
    };

    let fields: Vec<RequiredField> = class_data
        .fields
        .unwrap_or_default()
        .into_iter()
        .map(|(name, priority)| RequiredField { name, priority })
        .collect();

    for field in &fields {
        if let Err(msg) = validate_field_name(&field.name) {
            return Ok(HttpResponse::BadRequest().json(msg));
        }
    }

    let storage = service.get_storage(request);
    match storage
        .create_class(&auth.user, name, class_data.description, fields)
        .await
    {
        Ok(class) => Ok(HttpResponse::Ok().json(ClassResponse {
            class,
            accesstoken: auth.access_token,
        })),
        Err(e) => {
            error!("Error creating class: {}", e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}
