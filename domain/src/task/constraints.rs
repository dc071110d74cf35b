//! Domain constraints a response must satisfy for each task kind.

use super::kind::TaskKind;

/// Allowed sum units: single units, thousands and millions.
pub const ALLOWED_SUM_UNITS: [u64; 3] = [1, 1_000, 1_000_000];

/// What a validated answer may look like for one task.
///
/// Each variant belongs to exactly one [`TaskKind`]; see [`Constraints::kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Constraints {
    /// Answer is a block index; blocks shorter than `min_block_len`
    /// characters cannot hold the balance sheet.
    TableLocation {
        block_lengths: Vec<usize>,
        min_block_len: usize,
    },
    SumUnits { allowed: Vec<u64> },
    /// Answer must occur in `source` at or after byte `search_from`.
    EndMarker { source: String, search_from: usize },
    StructuredTable { min_keys: usize },
    ColumnDates,
    /// Answer selects rows by index; `row_paths[i]` is row `i`'s label path.
    ConceptItems { row_paths: Vec<Vec<String>> },
}

impl Constraints {
    pub fn table_location<S: AsRef<str>>(blocks: &[S], min_block_len: usize) -> Self {
        Self::TableLocation {
            block_lengths: blocks.iter().map(|b| b.as_ref().chars().count()).collect(),
            min_block_len,
        }
    }

    pub fn sum_units() -> Self {
        Self::SumUnits {
            allowed: ALLOWED_SUM_UNITS.to_vec(),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Constraints::TableLocation { .. } => TaskKind::LocateTableBlock,
            Constraints::SumUnits { .. } => TaskKind::IdentifySumUnits,
            Constraints::EndMarker { .. } => TaskKind::IdentifyTableEndMarker,
            Constraints::StructuredTable { .. } => TaskKind::ConvertTableToStructured,
            Constraints::ColumnDates => TaskKind::IdentifyColumnDates,
            Constraints::ConceptItems { .. } => TaskKind::ExtractConceptItems,
        }
    }

    /// Row label paths for concept selections; empty for other kinds.
    pub fn row_paths(&self) -> &[Vec<String>] {
        match self {
            Constraints::ConceptItems { row_paths } => row_paths,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_location_counts_characters() {
        let constraints = Constraints::table_location(&["ab", "€€€"], 3);
        assert_eq!(
            constraints,
            Constraints::TableLocation {
                block_lengths: vec![2, 3],
                min_block_len: 3
            }
        );
        assert_eq!(constraints.kind(), TaskKind::LocateTableBlock);
    }

    #[test]
    fn test_row_paths_only_for_concepts() {
        assert!(Constraints::ColumnDates.row_paths().is_empty());
        let concept = Constraints::ConceptItems {
            row_paths: vec![vec!["Cash".to_string()]],
        };
        assert_eq!(concept.row_paths().len(), 1);
    }
}
