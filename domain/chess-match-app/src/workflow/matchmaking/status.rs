use std::sync::Arc;

use crate::{
    domain::{PlayerId, queue::QueueService},
    workflow::matchmaking::QueueStatus,
};

pub trait QueueStatusUseCase {
    fn queue_status(&self, player_id: PlayerId) -> QueueStatus;
}

pub struct QueueStatusUseCaseImpl<Q: QueueService> {
    queue_service: Arc<Q>,
}

impl<Q: QueueService> QueueStatusUseCaseImpl<Q> {
    pub fn new(queue_service: Arc<Q>) -> Self {
        Self { queue_service }
    }
}

impl<Q: QueueService> QueueStatusUseCase for QueueStatusUseCaseImpl<Q> {
    fn queue_status(&self, player_id: PlayerId) -> QueueStatus {
        match self.queue_service.position(player_id) {
            Some(position) => QueueStatus::Queued { position },
            None => QueueStatus::NotQueued,
        }
    }
}
