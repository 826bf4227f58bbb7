use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::game::{Fingerprint, COLS};

/// Estimated value of dropping into `column` from some state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionValue {
    pub column: usize,
    pub value: f64,
}

/// Per-column action values for one state, always in column order.
pub type ActionValues = [ActionValue; COLS];

fn zero_entry() -> ActionValues {
    std::array::from_fn(|column| ActionValue { column, value: 0.0 })
}

/// Step sizes for the one-step temporal-difference update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TdParams {
    pub learning_rate: f64,
    pub discount_factor: f64,
}

/// Lookup table from board fingerprint to action values.
///
/// Entries are created lazily on first visit and never removed. On disk the
/// table is a list of `{state, values}` entries in fingerprint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    entries: BTreeMap<Fingerprint, ActionValues>,
}

/// One stored row of a [`QTable`].
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    state: Fingerprint,
    values: ActionValues,
}

impl Serialize for QTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.entries
                .iter()
                .map(|(&state, &values)| StoredEntry { state, values }),
        )
    }
}

impl<'de> Deserialize<'de> for QTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = Vec::<StoredEntry>::deserialize(deserializer)?;
        Ok(QTable {
            entries: stored.into_iter().map(|e| (e.state, e.values)).collect(),
        })
    }
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, state: Fingerprint) -> bool {
        self.entries.contains_key(&state)
    }

    pub fn get(&self, state: Fingerprint) -> Option<&ActionValues> {
        self.entries.get(&state)
    }

    /// Value of a single (state, action) pair, 0 when the state is unseen.
    pub fn value(&self, state: Fingerprint, action: usize) -> f64 {
        self.entries
            .get(&state)
            .map_or(0.0, |values| values[action].value)
    }

    /// Entry for `state`, inserting all-zero values if it was never visited.
    /// Returns whether the entry already existed.
    pub fn ensure(&mut self, state: Fingerprint) -> bool {
        let mut existed = true;
        self.entries.entry(state).or_insert_with(|| {
            existed = false;
            zero_entry()
        });
        existed
    }

    /// Highest action value recorded for `state`, 0 when unseen.
    pub fn best_value(&self, state: Fingerprint) -> f64 {
        self.entries.get(&state).map_or(0.0, |values| {
            values
                .iter()
                .map(|av| av.value)
                .fold(f64::NEG_INFINITY, f64::max)
        })
    }

    /// Greedy column for a known state. Ties go to the later column.
    pub fn best_action(&self, state: Fingerprint) -> Option<usize> {
        let values = self.entries.get(&state)?;
        let mut best = values[0];
        for av in &values[1..] {
            if av.value >= best.value {
                best = *av;
            }
        }
        Some(best.column)
    }

    /// Apply `new = old + lr * (reward + discount * best(state) - old)` to
    /// one pair and return the new value.
    pub fn update(&mut self, state: Fingerprint, action: usize, reward: f64, params: TdParams) -> f64 {
        let best = self.best_value(state);
        let slot = &mut self.entries.entry(state).or_insert_with(zero_entry)[action];
        slot.value += params.learning_rate * (reward + params.discount_factor * best - slot.value);
        slot.value
    }

    /// Consuming form of [`QTable::update`].
    pub fn updated(mut self, state: Fingerprint, action: usize, reward: f64, params: TdParams) -> Self {
        self.update(state, action, reward, params);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &ActionValues)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: TdParams = TdParams {
        learning_rate: 0.2,
        discount_factor: 0.1,
    };

    #[test]
    fn test_unseen_state_defaults() {
        let table = QTable::new();
        let state = Fingerprint(42);
        assert!(!table.contains(state));
        assert_eq!(table.best_value(state), 0.0);
        assert_eq!(table.value(state, 3), 0.0);
        assert_eq!(table.best_action(state), None);
    }

    #[test]
    fn test_ensure_inserts_zero_entry_once() {
        let mut table = QTable::new();
        assert!(!table.ensure(Fingerprint(7)));
        assert!(table.ensure(Fingerprint(7)));
        assert_eq!(table.len(), 1);

        let values = table.get(Fingerprint(7)).unwrap();
        for (col, av) in values.iter().enumerate() {
            assert_eq!(av.column, col);
            assert_eq!(av.value, 0.0);
        }
    }

    #[test]
    fn test_best_action_prefers_later_column_on_tie() {
        let mut table = QTable::new();
        table.ensure(Fingerprint(1));
        assert_eq!(table.best_action(Fingerprint(1)), Some(COLS - 1));

        table.update(Fingerprint(1), 2, 1.0, PARAMS);
        table.update(Fingerprint(1), 4, 1.0, PARAMS);
        // Columns 2 and 4 differ: the second update saw best = 0.2.
        assert_eq!(table.best_action(Fingerprint(1)), Some(4));
    }

    #[test]
    fn test_update_formula() {
        let mut table = QTable::new();
        let state = Fingerprint(100);

        let v = table.update(state, 3, 1.0, PARAMS);
        assert!((v - 0.2).abs() < 1e-12);

        // best(state) is now 0.2: 0.2 + 0.2 * (1.0 + 0.1 * 0.2 - 0.2)
        let v = table.update(state, 3, 1.0, PARAMS);
        assert!((v - 0.364).abs() < 1e-12);
    }

    #[test]
    fn test_negative_reward_lowers_value() {
        let mut table = QTable::new();
        let v = table.update(Fingerprint(5), 0, -0.1, PARAMS);
        assert!(v < 0.0);
        assert_eq!(table.best_value(Fingerprint(5)), 0.0);
        assert_eq!(table.best_action(Fingerprint(5)), Some(COLS - 1));
    }

    #[test]
    fn test_updated_is_consuming_form() {
        let table = QTable::new().updated(Fingerprint(9), 1, -1.0, PARAMS);
        assert!((table.value(Fingerprint(9), 1) + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_stored_as_entry_list() {
        let table = QTable::new()
            .updated(Fingerprint(321), 6, 1.0, PARAMS)
            .updated(Fingerprint(12), 0, -1.0, PARAMS);
        let json = serde_json::to_value(&table).unwrap();

        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["state"], 12);
        assert_eq!(rows[1]["state"], 321);
        assert_eq!(rows[1]["values"].as_array().unwrap().len(), COLS);

        let back: QTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_loads_inside_tagged_enum() {
        // Tagged enums buffer their content, which stringifies map keys.
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "kind")]
        enum Wrapper {
            Table { table: QTable },
        }

        let wrapped = Wrapper::Table {
            table: QTable::new().updated(Fingerprint(501), 3, 1.0, PARAMS),
        };
        let json = serde_json::to_string(&wrapped).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wrapped);
    }
}
