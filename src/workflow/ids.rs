use chrono::Utc;

pub const NODE_PREFIX: &str = "node";
pub const CONNECTION_PREFIX: &str = "conn";

/// Mints `"<prefix>-<token>"` ids from a monotonic counter.
///
/// The counter is seeded from the wall clock, so ids look like the
/// millisecond tokens older documents carry. Candidates that are already
/// taken are skipped, which keeps ids unique after a document is hydrated
/// from the backend.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::from_clock()
    }
}

impl IdGenerator {
    pub fn from_clock() -> Self {
        Self::starting_at(Utc::now().timestamp_millis().max(0) as u64)
    }

    pub fn starting_at(seed: u64) -> Self {
        Self { next: seed }
    }

    pub fn next_id(&mut self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate = format!("{prefix}-{}", self.next);
            self.next = self.next.wrapping_add(1);
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_from_seed() {
        let mut ids = IdGenerator::starting_at(7);
        assert_eq!(ids.next_id(NODE_PREFIX, |_| false), "node-7");
        assert_eq!(ids.next_id(CONNECTION_PREFIX, |_| false), "conn-8");
    }

    #[test]
    fn taken_candidates_are_skipped() {
        let mut ids = IdGenerator::starting_at(1);
        let taken = ["node-1", "node-2"];
        let id = ids.next_id(NODE_PREFIX, |candidate| taken.contains(&candidate));
        assert_eq!(id, "node-3");
    }
}
