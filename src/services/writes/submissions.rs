use super::{WriteGateway, WriteTicket};
use crate::models::CollectionKind;
use crate::models::submissions::requests::CreateSubmissionRequest;

impl WriteGateway {
    pub fn create_submission(&self, request: CreateSubmissionRequest) -> WriteTicket {
        self.create(CollectionKind::AssignmentSubmissions, request.into_fields())
    }

    pub fn delete_submission(&self, submission_id: &str) -> WriteTicket {
        self.delete(CollectionKind::AssignmentSubmissions, submission_id)
    }
}
