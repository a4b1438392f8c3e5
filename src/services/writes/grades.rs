use super::{WriteGateway, WriteTicket};
use crate::models::CollectionKind;
use crate::models::grades::requests::{CreateGradeRequest, UpdateGradeRequest};

impl WriteGateway {
    pub fn create_grade(&self, request: CreateGradeRequest) -> WriteTicket {
        self.create(CollectionKind::Grades, request.into_fields())
    }

    pub fn update_grade(&self, grade_id: &str, request: UpdateGradeRequest) -> WriteTicket {
        self.update(CollectionKind::Grades, grade_id, request.into_fields())
    }

    pub fn delete_grade(&self, grade_id: &str) -> WriteTicket {
        self.delete(CollectionKind::Grades, grade_id)
    }
}
