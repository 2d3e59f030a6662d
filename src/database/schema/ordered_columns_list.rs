use serde::{Deserialize, Serialize};

use crate::database::Column;

/// Columns of a table in their final order.
///
/// Columns without a requested position are appended. A column with a
/// position is inserted there (clamped to the end of the list), after which
/// every column is renumbered to its index so that later positioned inserts
/// shift the columns behind them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Column>", from = "Vec<Column>")]
pub struct OrderedColumnsList {
    columns: Vec<Column>,
}

impl OrderedColumnsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut list = Self::new();
        for column in columns {
            list.add(column);
        }
        list
    }

    pub fn add(&mut self, column: Column) {
        match column.position {
            None => self.columns.push(column),
            Some(position) => {
                let index = position.min(self.columns.len());
                self.columns.insert(index, column);
                Self::renumber(&mut self.columns);
                self.reorder();
            }
        }
    }

    pub fn get_ordered_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Rebuilds the list by replaying every positioned column into a fresh
    /// sequence, so positions past the end of the list land at the end once
    /// the columns in front of them are placed.
    fn reorder(&mut self) {
        let mut ordered: Vec<Column> = Vec::with_capacity(self.columns.len());
        for column in self.columns.drain(..) {
            match column.position {
                None => ordered.push(column),
                Some(position) => {
                    let index = position.min(ordered.len());
                    ordered.insert(index, column);
                    Self::renumber(&mut ordered);
                }
            }
        }
        self.columns = ordered;
    }

    fn renumber(columns: &mut [Column]) {
        for (i, column) in columns.iter_mut().enumerate() {
            column.position = Some(i);
        }
    }
}

impl From<Vec<Column>> for OrderedColumnsList {
    fn from(columns: Vec<Column>) -> Self {
        Self::from_columns(columns)
    }
}

impl From<OrderedColumnsList> for Vec<Column> {
    fn from(list: OrderedColumnsList) -> Self {
        list.columns
    }
}

impl<'a> IntoIterator for &'a OrderedColumnsList {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::PgType;

    fn col(name: &str) -> Column {
        Column::new(name, PgType::Text)
    }

    fn col_at(name: &str, position: usize) -> Column {
        Column::builder(name).position(position).build()
    }

    fn names(list: &OrderedColumnsList) -> Vec<&str> {
        list.get_ordered_columns().iter().map(|c| c.db_name.as_str()).collect()
    }

    fn assert_positions_consistent(list: &OrderedColumnsList) {
        for (i, c) in list.get_ordered_columns().iter().enumerate() {
            if let Some(p) = c.position {
                assert_eq!(p, i, "column {} claims position {} but sits at {}", c.db_name, p, i);
            }
        }
    }

    #[test]
    fn unpositioned_columns_keep_insertion_order() {
        let list = OrderedColumnsList::from_columns(vec![col("a"), col("b"), col("c")]);
        assert_eq!(names(&list), vec!["a", "b", "c"]);
        assert!(list.iter().all(|c| c.position.is_none()));
    }

    #[test]
    fn positioned_insert_shifts_and_renumbers() {
        let mut list = OrderedColumnsList::from_columns(vec![col("a"), col("b")]);
        list.add(col_at("id", 0));
        assert_eq!(names(&list), vec!["id", "a", "b"]);
        let positions: Vec<Option<usize>> = list.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);

        list.add(col_at("x", 1));
        assert_eq!(names(&list), vec!["id", "x", "a", "b"]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn out_of_range_position_is_normalized_to_the_end() {
        let mut list = OrderedColumnsList::new();
        list.add(col("a"));
        list.add(col_at("z", 10));
        assert_eq!(names(&list), vec!["a", "z"]);
        assert_eq!(list.get_ordered_columns()[1].position, Some(1));

        list.add(col("b"));
        list.add(col_at("y", 7));
        assert_eq!(names(&list), vec!["a", "z", "b", "y"]);
        assert_positions_consistent(&list);
    }

    #[test]
    fn every_insertion_sequence_keeps_positions_consistent() {
        // deterministic sweep over mixed positioned / unpositioned inserts
        for seed in 0u64..200 {
            let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let mut list = OrderedColumnsList::new();
            for i in 0..12 {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let name = format!("c{}", i);
                let column = if (state >> 33) % 3 == 0 {
                    col(&name)
                } else {
                    col_at(&name, ((state >> 40) % 15) as usize)
                };
                list.add(column);
                assert_eq!(list.len(), i + 1);
                assert_positions_consistent(&list);
                assert_eq!(list.get_ordered_columns(), list.get_ordered_columns());
            }
        }
    }

    #[test]
    fn clone_is_isolated_from_original() {
        let mut original = OrderedColumnsList::from_columns(vec![col("a"), col_at("b", 0)]);
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.add(col_at("c", 0));
        assert_eq!(names(&original), vec!["b", "a"]);
        assert_eq!(names(&copy), vec!["c", "b", "a"]);
        assert_eq!(original.get_ordered_columns()[0].position, Some(0));

        original.add(col("d"));
        assert_eq!(copy.len(), 3);
    }

    #[test]
    fn serde_round_trip_preserves_order() {
        let list = OrderedColumnsList::from_columns(vec![col("a"), col("b"), col_at("id", 0)]);
        let json = serde_json::to_string(&list).unwrap();
        let back: OrderedColumnsList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
