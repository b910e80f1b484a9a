use std::sync::Arc;

use crate::domain::{PlayerId, queue::QueueService};

pub trait LeaveQueueUseCase {
    /// Always succeeds, whether or not the player was queued.
    fn leave_queue(&self, player_id: PlayerId);
}

pub struct LeaveQueueUseCaseImpl<Q: QueueService> {
    queue_service: Arc<Q>,
}

impl<Q: QueueService> LeaveQueueUseCaseImpl<Q> {
    pub fn new(queue_service: Arc<Q>) -> Self {
        Self { queue_service }
    }
}

impl<Q: QueueService> LeaveQueueUseCase for LeaveQueueUseCaseImpl<Q> {
    fn leave_queue(&self, player_id: PlayerId) {
        if self.queue_service.leave(player_id) {
            log::debug!("Player {} left the queue", player_id);
        }
    }
}
