//! Value-date column selection.

/// Column holding the most recent balance sheet date.
///
/// Only the first `column_count` dates are considered (the table's median
/// number of value columns); the latest of them wins, the first on ties.
/// An empty list selects column 0.
///
/// ```
/// use filing_domain::table::value_column;
///
/// let dates = vec!["2022-12-31".to_string(), "2023-12-31".to_string(), "2024-06-30".to_string()];
/// assert_eq!(value_column(&dates, Some(2)), 1);
/// assert_eq!(value_column(&dates, None), 2);
/// assert_eq!(value_column(&[], Some(2)), 0);
/// ```
pub fn value_column(dates: &[String], column_count: Option<usize>) -> usize {
    let considered = column_count.unwrap_or(dates.len()).min(dates.len());
    dates[..considered]
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, &String)>, (index, date)| match best {
            Some((_, latest)) if latest >= date => best,
            _ => Some((index, date)),
        })
        .map(|(index, _)| index)
        .unwrap_or(0)
}
