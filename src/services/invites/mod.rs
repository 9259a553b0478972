pub mod inspect;
pub mod issue;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::invites::requests::InviteInfoRequest;
use crate::storage::Storage;

pub struct InviteService {
    storage: Option<Arc<dyn Storage>>,
}

impl InviteService {
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

    // 签发邀请令牌（仅管理员）
    pub async fn issue_invite(&self, req: &HttpRequest) -> ActixResult<HttpResponse> {
        issue::issue_invite(self, req).await
    }

    // 查看邀请信息（仅非成员）
    pub async fn inspect_invite(
        &self,
        req: &HttpRequest,
        info_data: InviteInfoRequest,
    ) -> ActixResult<HttpResponse> {
        inspect::inspect_invite(self, req, info_data).await
    }
}
