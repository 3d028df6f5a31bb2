use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

struct TimerEntry {
    expires: Instant,
    member: String,
}

/// FIFO expiry queue with superseding re-insertion.
///
/// Every insertion expires a fixed delay after it was added, so insertion
/// order equals expiry order and the queue never needs sorting. The side map
/// remembers the expiry instant of each member's most recent insertion; a
/// dequeued record whose instant differs from the side map entry belongs to
/// an older insertion and is silently discarded.
pub struct TimerQueue {
    delay: Duration,
    queue: VecDeque<TimerEntry>,
    latest: HashMap<String, Instant>,
}

impl TimerQueue {
    /// Panics when `delay` is zero; a queue where entries expire the moment
    /// they are added cannot keep anyone alive.
    pub fn new(delay: Duration) -> Self {
        if delay.is_zero() {
            panic!("timer queues must have a positive delay");
        }
        Self {
            delay,
            queue: VecDeque::new(),
            latest: HashMap::new(),
        }
    }

    /// Arms (or re-arms) the expiry timer for `member`.
    pub fn add(&mut self, member: &str) {
        let expires = Instant::now() + self.delay;
        self.queue.push_back(TimerEntry {
            expires,
            member: member.to_string(),
        });
        self.latest.insert(member.to_string(), expires);
    }

    /// Reports one member whose latest insertion has expired, or `None` when
    /// nothing has. Stale records from superseded insertions are reaped along
    /// the way. Call repeatedly to drain everything that is due.
    pub fn poll_expired(&mut self) -> Option<String> {
        while let Some(head) = self.queue.front() {
            if Instant::now() < head.expires {
                return None;
            }
            let entry = self.queue.pop_front()?;
            // The instant comparison must be exact: only the record written
            // by the member's most recent add() matches the side map.
            if self.latest.get(&entry.member) == Some(&entry.expires) {
                self.latest.remove(&entry.member);
                return Some(entry.member);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    #[should_panic(expected = "positive delay")]
    fn test_zero_delay_panics() {
        TimerQueue::new(Duration::ZERO);
    }

    #[test]
    fn test_add_keeps_fifo_order() {
        let mut tq = TimerQueue::new(Duration::from_secs(1));

        for i in 0..10 {
            let before = Instant::now();
            tq.add(&format!("entry-{}", i));
            let after = Instant::now();

            assert_eq!(tq.queue.len(), i + 1);
            let armed = tq.queue[i].expires - Duration::from_secs(1);
            assert!(before <= armed && armed <= after, "expiry out of range");

            for (j, entry) in tq.queue.iter().enumerate() {
                assert_eq!(entry.member, format!("entry-{}", j));
            }
        }
    }

    #[test]
    fn test_poll_reports_latest_insertion_only() {
        let mut tq = TimerQueue::new(Duration::from_millis(1));
        assert!(tq.poll_expired().is_none());

        for member in ["entry1", "entry2", "entry3", "entry1", "entry4"] {
            tq.add(member); // the second entry1 supersedes the first
            sleep(Duration::from_micros(200));
        }
        sleep(Duration::from_millis(5));

        assert_eq!(tq.poll_expired().as_deref(), Some("entry2"));
        assert_eq!(tq.poll_expired().as_deref(), Some("entry3"));
        assert_eq!(tq.poll_expired().as_deref(), Some("entry1"));
        assert_eq!(tq.poll_expired().as_deref(), Some("entry4"));
        assert!(tq.poll_expired().is_none());
        assert!(tq.poll_expired().is_none());
    }

    #[test]
    fn test_poll_waits_for_expiry() {
        let mut tq = TimerQueue::new(Duration::from_millis(60));

        tq.add("entry1");
        tq.add("entry2");
        sleep(Duration::from_millis(20));
        tq.add("entry1"); // re-armed 20ms after the others

        assert!(tq.poll_expired().is_none());

        sleep(Duration::from_millis(50));
        // 70ms in: the first records are due, entry1's latest is not
        assert_eq!(tq.poll_expired().as_deref(), Some("entry2"));
        assert!(tq.poll_expired().is_none());

        sleep(Duration::from_millis(40));
        assert_eq!(tq.poll_expired().as_deref(), Some("entry1"));
        assert!(tq.poll_expired().is_none());
    }

    #[test]
    fn test_poll_cyclic_reinsertion_drains_clean() {
        let mut tq = TimerQueue::new(Duration::from_millis(1));

        tq.add("test-0");
        for i in 1..=100 {
            tq.add(&format!("test-{}", i));
            sleep(Duration::from_millis(2));
            assert_eq!(tq.poll_expired(), Some(format!("test-{}", i - 1)));
        }

        assert_eq!(tq.poll_expired().as_deref(), Some("test-100"));
        assert!(tq.poll_expired().is_none());
        assert!(tq.queue.is_empty(), "queue should be empty");
        assert!(tq.latest.is_empty(), "side map should be empty");
    }
}
