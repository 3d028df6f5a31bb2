/// Outcome of a `since` query.
#[derive(Debug)]
pub struct Delta {
    /// False when the log no longer retains the requested range; the caller
    /// must fall back to a full snapshot.
    pub complete: bool,
    /// Members revised at cursors `[earliest, next_cursor)`, oldest first.
    pub entries: Vec<String>,
    /// The cursor a caller should present next time.
    pub next_cursor: u64,
}

/// Bounded log of revised members. Unsynchronized; the coordinator's request
/// lock serializes access.
pub struct ChangeLog {
    recent: Vec<String>,
    start: u64,
    capacity: usize,
}

impl ChangeLog {
    /// Panics when `capacity < 2`; halving truncation needs at least two
    /// retained entries to make progress.
    pub fn new(capacity: usize) -> Self {
        if capacity < 2 {
            panic!("change logs must retain at least two entries");
        }
        Self {
            recent: Vec::new(),
            start: 0,
            capacity,
        }
    }

    /// Records a revision of `member` and returns its cursor.
    pub fn add_update(&mut self, member: &str) -> u64 {
        let cursor = self.start + self.recent.len() as u64;
        self.recent.push(member.to_string());
        if self.recent.len() >= self.capacity {
            // discard the older half; survivors keep their cursor values
            let midpoint = self.capacity / 2;
            self.recent.drain(..midpoint);
            self.start += midpoint as u64;
        }
        cursor
    }

    /// Everything revised at or after `earliest`. A cursor we no longer
    /// retain yields an incomplete result; a cursor at or beyond the end
    /// yields a complete empty one.
    pub fn since(&self, earliest: u64) -> Delta {
        let next_cursor = self.start + self.recent.len() as u64;
        if earliest < self.start {
            return Delta {
                complete: false,
                entries: Vec::new(),
                next_cursor,
            };
        }
        let offset = ((earliest - self.start) as usize).min(self.recent.len());
        Delta {
            complete: true,
            entries: self.recent[offset..].to_vec(),
            next_cursor,
        }
    }

    /// The cursor the next revision will be assigned.
    pub fn next_cursor(&self) -> u64 {
        self.start + self.recent.len() as u64
    }

    /// Oldest cursor still retained.
    pub fn start(&self) -> u64 {
        self.start
    }
}
