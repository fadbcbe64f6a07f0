//! Ordered condition → tag table.

/// One row of the condition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEntry {
    /// Raw boolean expression, e.g. `"(금리 OR 환율) AND 속보"`
    pub condition: String,

    /// Label reported when the condition matches
    pub tag: String,
}

/// Conditions in source row order.
///
/// Behaves like an insertion-ordered map: re-inserting an existing condition
/// replaces its tag but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTable {
    entries: Vec<ConditionEntry>,
}

impl ConditionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from tabular rows (column 0 = condition, column 1 = tag).
    ///
    /// Rows where either of the first two cells is blank are skipped.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for row in rows {
            let row = row.as_ref();
            let (Some(condition), Some(tag)) = (row.first(), row.get(1)) else {
                continue;
            };
            let (condition, tag) = (condition.as_ref().trim(), tag.as_ref().trim());
            if condition.is_empty() || tag.is_empty() {
                continue;
            }
            table.insert(condition, tag);
        }
        table
    }

    /// Insert a condition, overwriting the tag of an existing one.
    pub fn insert(&mut self, condition: impl Into<String>, tag: impl Into<String>) {
        let condition = condition.into();
        let tag = tag.into();
        match self.entries.iter_mut().find(|e| e.condition == condition) {
            Some(existing) => existing.tag = tag,
            None => self.entries.push(ConditionEntry { condition, tag }),
        }
    }

    pub fn get(&self, condition: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.condition == condition)
            .map(|e| e.tag.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_condition_last_tag_wins() {
        let table = ConditionTable::from_rows([
            ["kw1 AND kw2", "tagA"],
            ["other", "tagC"],
            ["kw1 AND kw2", "tagB"],
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("kw1 AND kw2"), Some("tagB"));

        // Position of the first occurrence is kept.
        let order: Vec<_> = table.iter().map(|e| e.condition.as_str()).collect();
        assert_eq!(order, vec!["kw1 AND kw2", "other"]);
    }

    #[test]
    fn test_short_and_blank_rows_skipped() {
        let rows: Vec<Vec<&str>> = vec![
            vec!["only one cell"],
            vec![],
            vec!["", "tag"],
            vec!["cond", "   "],
            vec!["  keep  ", " tag ", "extra column"],
        ];
        let table = ConditionTable::from_rows(rows);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("keep"), Some("tag"));
    }

    #[test]
    fn test_preserves_row_order() {
        let table = ConditionTable::from_rows([["c", "1"], ["a", "2"], ["b", "3"]]);
        let tags: Vec<_> = table.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["1", "2", "3"]);
    }
}
