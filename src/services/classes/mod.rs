pub mod create;
pub mod information;
pub mod view;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::classes::requests::{CreateClassRequest, InfoDeleteRequest, InfoWriteRequest};
use crate::storage::Storage;

pub struct ClassService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 创建班级
    pub async fn create_class(
        &self,
        req: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, req, class_data).await
    }

    // 成员视角的班级信息页
    pub async fn view_class(&self, req: &HttpRequest) -> ActixResult<HttpResponse> {
        view::view_class(self, req).await
    }

    // 新增班级信息项
    pub async fn add_info(
        &self,
        req: &HttpRequest,
        info_data: InfoWriteRequest,
    ) -> ActixResult<HttpResponse> {
        information::add_info(self, req, info_data).await
    }

    // 更新班级信息项
    pub async fn update_info(
        &self,
        req: &HttpRequest,
        info_data: InfoWriteRequest,
    ) -> ActixResult<HttpResponse> {
        information::update_info(self, req, info_data).await
    }

    // 删除班级信息项
    pub async fn delete_info(
        &self,
        req: &HttpRequest,
        info_data: InfoDeleteRequest,
    ) -> ActixResult<HttpResponse> {
        information::delete_info(self, req, info_data).await
    }
}
