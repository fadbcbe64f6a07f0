//! Condition spreadsheet loader.
//!
//! Reads the first worksheet of an `.xlsx` file: column 0 is the condition
//! expression, column 1 the tag.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};

use crate::error::{AppError, Result};
use crate::models::{ConditionTable, ConditionsConfig};

/// The only spreadsheet type accepted.
pub const CONDITION_FILE_EXTENSION: &str = "xlsx";

/// Loads a full replacement [`ConditionTable`] from a spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct ConditionLoader {
    skip_header: bool,
}

impl ConditionLoader {
    pub fn new(config: &ConditionsConfig) -> Self {
        Self {
            skip_header: config.skip_header,
        }
    }

    /// Load the table. Nothing is returned unless the whole file was read.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ConditionTable> {
        let path = path.as_ref();
        Self::check_extension(path)?;

        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::condition_file(format!("{} has no sheets", path.display())))??;

        let rows: Vec<Vec<String>> = range
            .rows()
            .skip(usize::from(self.skip_header))
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let table = ConditionTable::from_rows(&rows);
        log::info!(
            "Loaded {} condition(s) from {} ({} row(s))",
            table.len(),
            path.display(),
            rows.len()
        );
        Ok(table)
    }

    fn check_extension(path: &Path) -> Result<()> {
        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CONDITION_FILE_EXTENSION));
        if accepted {
            Ok(())
        } else {
            Err(AppError::condition_file(format!(
                "{} is not a .{} file",
                path.display(),
                CONDITION_FILE_EXTENSION
            )))
        }
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
