use super::{WriteGateway, WriteTicket};
use crate::models::CollectionKind;
use crate::models::classes::requests::{CreateClassRequest, UpdateClassRequest};

impl WriteGateway {
    pub fn create_class(&self, request: CreateClassRequest) -> WriteTicket {
        self.create(CollectionKind::Classes, request.into_fields())
    }

    pub fn update_class(&self, class_id: &str, request: UpdateClassRequest) -> WriteTicket {
        self.update(CollectionKind::Classes, class_id, request.into_fields())
    }

    pub fn delete_class(&self, class_id: &str) -> WriteTicket {
        self.delete(CollectionKind::Classes, class_id)
    }
}
