//! Balance table model and block slicing helpers.

mod balance_table;
mod columns;
mod text;

pub use balance_table::{BalanceTable, TableRow, TableSection};
pub use columns::value_column;
pub use text::{crop_table, find_marker, marker_search_offset, pre_table_text, table_tail};
