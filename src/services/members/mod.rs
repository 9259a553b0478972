pub mod join;
pub mod kick;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::members::requests::{JoinClassRequest, KickMemberRequest};
use crate::storage::Storage;

pub struct MemberService {
    storage: Option<Arc<dyn Storage>>,
}

impl MemberService {
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

    // 接受邀请加入班级
    pub async fn join_class(
        &self,
        req: &HttpRequest,
        join_data: JoinClassRequest,
    ) -> ActixResult<HttpResponse> {
        join::join_class(self, req, join_data).await
    }

    // 踢出班级成员（仅管理员）
    pub async fn kick_member(
        &self,
        req: &HttpRequest,
        kick_data: KickMemberRequest,
    ) -> ActixResult<HttpResponse> {
        kick::kick_member(self, req, kick_data).await
    }
}
