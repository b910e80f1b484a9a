use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};

use crate::domain::PlayerId;

#[derive(Clone, Debug, PartialEq)]
pub struct QueueEntry {
    pub player_id: PlayerId,
    pub joined_at: DateTime<Utc>,
    sequence: u64,
}

impl QueueEntry {
    /// Total order of the queue. The sequence breaks ties between equal
    /// timestamps so two entries are never "joined at the same time".
    fn join_order(&self) -> (DateTime<Utc>, u64) {
        (self.joined_at, self.sequence)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    AlreadyQueued,
    Waiting,
    /// The opponent's entry was taken out of the queue; the caller creates
    /// the session.
    Paired(PlayerId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    NotQueued,
    Waiting,
    /// This caller joined later than the opponent and creates the session.
    Create(PlayerId),
    /// A pairing exists but the opponent's call creates the session.
    AwaitCreation(PlayerId),
}

pub trait QueueService {
    fn join(&self, player: PlayerId, date: DateTime<Utc>) -> JoinOutcome;
    fn poll(&self, player: PlayerId) -> PollOutcome;
    fn leave(&self, player: PlayerId) -> bool;
    /// Called by the creator once the session for a pairing exists.
    fn complete_pairing(&self, waiting_player: PlayerId);
    /// Called by the creator when the session could not be created; puts the
    /// reserved entries back at their original place in the queue.
    fn cancel_pairing(&self, waiting_player: PlayerId);
    /// 1-based position in join order.
    fn position(&self, player: PlayerId) -> Option<usize>;
    fn len(&self) -> usize;
}

#[derive(Clone, Debug)]
struct PendingPairing {
    creator: PlayerId,
    creator_entry: Option<QueueEntry>,
    waiting_entry: QueueEntry,
}

struct QueueRegistry {
    entries: Vec<QueueEntry>,
    pending: HashMap<PlayerId, PendingPairing>,
    next_sequence: u64,
}

impl QueueRegistry {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            pending: HashMap::new(),
            next_sequence: 0,
        }
    }

    fn increment_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn entry_index(&self, player: PlayerId) -> Option<usize> {
        self.entries.iter().position(|e| e.player_id == player)
    }

    fn is_pairing(&self, player: PlayerId) -> bool {
        self.pending.contains_key(&player)
            || self.pending.values().any(|p| p.creator == player)
    }

    fn insert_sorted(&mut self, entry: QueueEntry) {
        if self.entry_index(entry.player_id).is_some() {
            return;
        }
        let index = self
            .entries
            .partition_point(|e| e.join_order() < entry.join_order());
        self.entries.insert(index, entry);
    }

    fn earliest_other(&self, player: PlayerId) -> Option<usize> {
        self.entries.iter().position(|e| e.player_id != player)
    }

    fn join(&mut self, player: PlayerId, date: DateTime<Utc>) -> JoinOutcome {
        if self.entry_index(player).is_some() || self.is_pairing(player) {
            return JoinOutcome::AlreadyQueued;
        }
        if let Some(index) = self.earliest_other(player) {
            let opponent_entry = self.entries.remove(index);
            let opponent = opponent_entry.player_id;
            self.pending.insert(
                opponent,
                PendingPairing {
                    creator: player,
                    creator_entry: None,
                    waiting_entry: opponent_entry,
                },
            );
            return JoinOutcome::Paired(opponent);
        }
        let sequence = self.increment_sequence();
        self.insert_sorted(QueueEntry {
            player_id: player,
            joined_at: date,
            sequence,
        });
        JoinOutcome::Waiting
    }

    fn poll(&mut self, player: PlayerId) -> PollOutcome {
        if let Some(pairing) = self.pending.get(&player) {
            return PollOutcome::AwaitCreation(pairing.creator);
        }
        let Some(own_index) = self.entry_index(player) else {
            return PollOutcome::NotQueued;
        };
        let Some(other_index) = self.earliest_other(player) else {
            return PollOutcome::Waiting;
        };

        let own_order = self.entries[own_index].join_order();
        let other = &self.entries[other_index];
        if own_order <= other.join_order() {
            return PollOutcome::AwaitCreation(other.player_id);
        }

        // own_index > other_index because the vector is sorted by join order
        let own_entry = self.entries.remove(own_index);
        let other_entry = self.entries.remove(other_index);
        let opponent = other_entry.player_id;
        self.pending.insert(
            opponent,
            PendingPairing {
                creator: player,
                creator_entry: Some(own_entry),
                waiting_entry: other_entry,
            },
        );
        PollOutcome::Create(opponent)
    }

    fn leave(&mut self, player: PlayerId) -> bool {
        match self.entry_index(player) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn cancel_pairing(&mut self, waiting_player: PlayerId) {
        if let Some(pairing) = self.pending.remove(&waiting_player) {
            self.insert_sorted(pairing.waiting_entry);
            if let Some(entry) = pairing.creator_entry {
                self.insert_sorted(entry);
            }
        }
    }

    #[cfg(test)]
    fn seed(&mut self, player: PlayerId, date: DateTime<Utc>) {
        let sequence = self.increment_sequence();
        self.insert_sorted(QueueEntry {
            player_id: player,
            joined_at: date,
            sequence,
        });
    }
}

#[derive(Clone)]
pub struct QueueServiceImpl {
    queue_registry: Arc<Mutex<QueueRegistry>>,
}

impl QueueServiceImpl {
    pub fn new() -> Self {
        Self {
            queue_registry: Arc::new(Mutex::new(QueueRegistry::new())),
        }
    }

    fn registry(&self) -> MutexGuard<'_, QueueRegistry> {
        // every registry operation leaves it consistent, so a poisoned lock is still usable
        self.queue_registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl QueueService for QueueServiceImpl {
    fn join(&self, player: PlayerId, date: DateTime<Utc>) -> JoinOutcome {
        self.registry().join(player, date)
    }

    fn poll(&self, player: PlayerId) -> PollOutcome {
        self.registry().poll(player)
    }

    fn leave(&self, player: PlayerId) -> bool {
        self.registry().leave(player)
    }

    fn complete_pairing(&self, waiting_player: PlayerId) {
        self.registry().pending.remove(&waiting_player);
    }

    fn cancel_pairing(&self, waiting_player: PlayerId) {
        self.registry().cancel_pairing(waiting_player);
    }

    fn position(&self, player: PlayerId) -> Option<usize> {
        self.registry().entry_index(player).map(|index| index + 1)
    }

    fn len(&self) -> usize {
        self.registry().entries.len()
    }
}
