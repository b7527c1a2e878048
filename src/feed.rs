use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

/// "Something in this room changed." Carries nothing else, listeners re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomChanged {
    pub room_id: Uuid,
}

#[derive(Clone)]
pub struct RoomFeed {
    tx: broadcast::Sender<RoomChanged>,
}

impl RoomFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    pub fn notify(&self, room_id: Uuid) {
        // nobody listening is fine
        let _ = self.tx.send(RoomChanged { room_id });
    }

    pub fn subscribe(&self, room_id: Uuid) -> RoomSubscription {
        RoomSubscription {
            room_id,
            rx: self.tx.subscribe(),
        }
    }
}

pub struct RoomSubscription {
    room_id: Uuid,
    rx: broadcast::Receiver<RoomChanged>,
}

impl RoomSubscription {
    /// Waits for the next change in this room. `false` once the feed is gone.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.rx.recv().await {
                Ok(RoomChanged { room_id }) if room_id == self.room_id => return true,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(room_id = %self.room_id, skipped, "feed lagged, refreshing");
                    return true;
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn only_hears_its_own_room() {
        let feed = RoomFeed::new(8);
        let ours = Uuid::now_v7();
        let theirs = Uuid::now_v7();
        let mut sub = feed.subscribe(ours);

        feed.notify(theirs);
        assert!(timeout(Duration::from_millis(50), sub.changed()).await.is_err());

        feed.notify(theirs);
        feed.notify(ours);
        assert!(sub.changed().await);
    }

    #[tokio::test]
    async fn lagging_still_means_refresh() {
        let feed = RoomFeed::new(2);
        let room = Uuid::now_v7();
        let mut sub = feed.subscribe(room);
        for _ in 0..5 {
            feed.notify(room);
        }
        assert!(sub.changed().await);
    }

    #[tokio::test]
    async fn closes_with_the_feed() {
        let feed = RoomFeed::new(2);
        let mut sub = feed.subscribe(Uuid::now_v7());
        drop(feed);
        assert!(!sub.changed().await);
    }

    #[test]
    fn notify_without_listeners() {
        RoomFeed::new(1).notify(Uuid::now_v7());
    }
}
