//! Team leaderboard: store abstraction, ranking and team aggregates

use crate::StoreError;
pub use proto::{LeaderboardEntry, LeaderboardPush, NewEntry, Side};
use serde::Serialize;
use std::collections::HashMap;

// Abstract wall clock (timestamps for stored rows)
pub trait Clock {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Persistence for round results
pub trait LeaderboardStore {
    fn insert_entry(&mut self, entry: &NewEntry) -> Result<(), StoreError>;

    /// Best `limit` entries, highest score first
    fn query_top_entries(
        &self,
        event_tag: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError>;

    fn query_all_entries(&self, event_tag: &str) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

/// Highest score first; ties go to whoever got there first
pub fn rank_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

pub fn top_entries(entries: &[LeaderboardEntry], limit: usize) -> Vec<LeaderboardEntry> {
    let mut ranked = entries.to_vec();
    rank_entries(&mut ranked);
    ranked.truncate(limit);
    ranked
}

/// Per-side points and head count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamTotals {
    pub points: u64,
    pub players: u32,
}

/// Summary of all persisted rounds for one event.
///
/// Always recomputed from the full set of rows, never patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamAggregate {
    pub team_a: TeamTotals,
    pub team_b: TeamTotals,
    pub team_a_percent: u8,
    pub team_b_percent: u8,
}

impl Default for TeamAggregate {
    fn default() -> Self {
        Self {
            team_a: TeamTotals::default(),
            team_b: TeamTotals::default(),
            team_a_percent: 50,
            team_b_percent: 50,
        }
    }
}

impl TeamAggregate {
    pub fn compute(entries: &[LeaderboardEntry]) -> Self {
        let mut aggregate = Self::default();
        for entry in entries {
            let totals = match entry.side {
                Side::TeamA => &mut aggregate.team_a,
                Side::TeamB => &mut aggregate.team_b,
            };
            totals.points += u64::from(entry.score);
            totals.players += 1;
        }

        let total = aggregate.team_a.points + aggregate.team_b.points;
        if total > 0 {
            // Round half up, then give the remainder to team B so the pair sums to 100
            let a = (aggregate.team_a.points * 200 + total) / (2 * total);
            aggregate.team_a_percent = a as u8;
            aggregate.team_b_percent = 100 - a as u8;
        }
        aggregate
    }

    pub fn totals(&self, side: Side) -> TeamTotals {
        match side {
            Side::TeamA => self.team_a,
            Side::TeamB => self.team_b,
        }
    }

    pub fn percent(&self, side: Side) -> u8 {
        match side {
            Side::TeamA => self.team_a_percent,
            Side::TeamB => self.team_b_percent,
        }
    }

    /// The side ahead on share, if anyone is
    pub fn leader(&self) -> Option<Side> {
        match self.team_a_percent.cmp(&self.team_b_percent) {
            std::cmp::Ordering::Greater => Some(Side::TeamA),
            std::cmp::Ordering::Less => Some(Side::TeamB),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Process-local store, used offline and in tests
pub struct InMemoryLeaderboard {
    clock: Box<dyn Clock>,
    entries: HashMap<String, Vec<LeaderboardEntry>>,
}

impl InMemoryLeaderboard {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            entries: HashMap::new(),
        }
    }

    /// Apply a row pushed from elsewhere
    pub fn apply_push(&mut self, push: &LeaderboardPush) {
        match push {
            LeaderboardPush::EntryInserted { event_tag, entry } => self
                .entries
                .entry(event_tag.clone())
                .or_default()
                .push(entry.clone()),
            LeaderboardPush::Reset { event_tag } => {
                self.entries.remove(event_tag);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLeaderboard {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl LeaderboardStore for InMemoryLeaderboard {
    fn insert_entry(&mut self, entry: &NewEntry) -> Result<(), StoreError> {
        if entry.name.trim().is_empty() {
            return Err(StoreError::Rejected("name is required".to_string()));
        }
        let row = entry.clone().into_entry(self.clock.now_ms());
        self.entries
            .entry(entry.event_tag.clone())
            .or_default()
            .push(row);
        Ok(())
    }

    fn query_top_entries(
        &self,
        event_tag: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(self
            .entries
            .get(event_tag)
            .map(|rows| top_entries(rows, limit))
            .unwrap_or_default())
    }

    fn query_all_entries(&self, event_tag: &str) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(self.entries.get(event_tag).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct MockClock {
        time_ms: Rc<Cell<u64>>,
    }

    impl Clock for MockClock {
        fn now_ms(&self) -> u64 {
            let now = self.time_ms.get();
            self.time_ms.set(now + 1);
            now
        }
    }

    fn store() -> InMemoryLeaderboard {
        InMemoryLeaderboard::new(Box::new(MockClock {
            time_ms: Rc::new(Cell::new(1000)),
        }))
    }

    fn entry(name: &str, score: u32, side: Side, created_at: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            score,
            side,
            created_at,
        }
    }

    fn new_entry(name: &str, score: u32, side: Side) -> NewEntry {
        NewEntry {
            name: name.to_string(),
            score,
            side,
            event_tag: "wedding".to_string(),
        }
    }

    #[test]
    fn test_empty_aggregate_is_neutral() {
        let aggregate = TeamAggregate::compute(&[]);
        assert_eq!((aggregate.team_a_percent, aggregate.team_b_percent), (50, 50));
        assert_eq!(aggregate.leader(), None);
        assert_eq!(aggregate, TeamAggregate::default());
    }

    #[test]
    fn test_zero_points_stay_neutral_but_count_players() {
        let rows = vec![entry("A", 0, Side::TeamA, 1), entry("B", 0, Side::TeamB, 2)];
        let aggregate = TeamAggregate::compute(&rows);
        assert_eq!(aggregate.team_a_percent + aggregate.team_b_percent, 100);
        assert_eq!(aggregate.team_a_percent, 50);
        assert_eq!(aggregate.team_a.players, 1);
        assert_eq!(aggregate.team_b.players, 1);
    }

    #[test]
    fn test_percentages_always_sum_to_100() {
        // 1/3 vs 2/3 would round to 33 + 67; 1/6 vs 5/6 to 17 + 83
        for (a, b) in [(1, 2), (1, 5), (13, 10), (1, 1), (7, 0), (0, 3), (5, 3)] {
            let rows = vec![entry("A", a, Side::TeamA, 1), entry("B", b, Side::TeamB, 2)];
            let aggregate = TeamAggregate::compute(&rows);
            assert_eq!(
                aggregate.team_a_percent as u32 + aggregate.team_b_percent as u32,
                100,
                "Shares for {}:{} must sum to 100",
                a,
                b
            );
        }
        let rows = vec![entry("A", 13, Side::TeamA, 1), entry("B", 10, Side::TeamB, 2)];
        let aggregate = TeamAggregate::compute(&rows);
        assert_eq!((aggregate.team_a_percent, aggregate.team_b_percent), (57, 43));
        assert_eq!(aggregate.leader(), Some(Side::TeamA));
    }

    #[test]
    fn test_half_rounds_up_for_team_a() {
        // 1 of 8 points is 12.5%
        let rows = vec![entry("A", 1, Side::TeamA, 1), entry("B", 7, Side::TeamB, 2)];
        let aggregate = TeamAggregate::compute(&rows);
        assert_eq!((aggregate.team_a_percent, aggregate.team_b_percent), (13, 87));
    }

    #[test]
    fn test_ranking_breaks_ties_by_time() {
        let rows = vec![
            entry("Late", 5, Side::TeamA, 30),
            entry("Low", 1, Side::TeamB, 5),
            entry("Early", 5, Side::TeamB, 10),
            entry("Top", 9, Side::TeamA, 50),
        ];
        let names: Vec<String> = top_entries(&rows, 3).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Top", "Early", "Late"]);
    }

    #[test]
    fn test_in_memory_store_round_trip() {
        let mut store = store();
        store.insert_entry(&new_entry("Asha", 3, Side::TeamA)).expect("Insert");
        store.insert_entry(&new_entry("Ravi", 6, Side::TeamB)).expect("Insert");

        let top = store.query_top_entries("wedding", 5).expect("Query");
        assert_eq!(top[0].name, "Ravi");
        assert_eq!(top[1].created_at, 1000, "Timestamp comes from the clock");
        assert!(store.query_all_entries("other").expect("Query").is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_in_memory_store_rejects_blank_name() {
        let mut store = store();
        let result = store.insert_entry(&new_entry("   ", 3, Side::TeamA));
        assert!(matches!(result, Err(StoreError::Rejected(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_push_updates_store() {
        let mut store = store();
        store.apply_push(&LeaderboardPush::EntryInserted {
            event_tag: "wedding".to_string(),
            entry: entry("Mo", 4, Side::TeamB, 7),
        });
        assert_eq!(store.query_all_entries("wedding").expect("Query").len(), 1);
        store.apply_push(&LeaderboardPush::Reset {
            event_tag: "wedding".to_string(),
        });
        assert!(store.is_empty());
    }
}
