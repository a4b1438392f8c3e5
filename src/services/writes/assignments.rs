use super::{WriteGateway, WriteTicket};
use crate::models::CollectionKind;
use crate::models::assignments::requests::CreateAssignmentRequest;

impl WriteGateway {
    pub fn create_assignment(&self, request: CreateAssignmentRequest) -> WriteTicket {
        self.create(CollectionKind::Assignments, request.into_fields())
    }

    pub fn delete_assignment(&self, assignment_id: &str) -> WriteTicket {
        self.delete(CollectionKind::Assignments, assignment_id)
    }
}
