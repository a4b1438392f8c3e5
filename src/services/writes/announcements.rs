use super::{WriteGateway, WriteTicket};
use crate::models::CollectionKind;
use crate::models::announcements::requests::CreateAnnouncementRequest;
use crate::utils::now_epoch_seconds;

impl WriteGateway {
    /// 未指定发送时间时使用当前时间
    pub fn create_announcement(&self, request: CreateAnnouncementRequest) -> WriteTicket {
        self.create(
            CollectionKind::Announcements,
            request.into_fields(now_epoch_seconds()),
        )
    }

    pub fn delete_announcement(&self, announcement_id: &str) -> WriteTicket {
        self.delete(CollectionKind::Announcements, announcement_id)
    }
}
