use chrono::NaiveDate;
use statement_core::{
    MetricsError, MetricsResult, Numeric, RawCell, RawStatement, StatementKind, StatementTable,
};

/// Header given to a label column that was exported without a name.
pub const UNNAMED_INDEX: &str = "Unnamed: 0";
/// Metadata row carrying the currency code; never numeric.
pub const CURRENCY_ROW: &str = "reportedCurrency";

const PERIOD_FORMAT: &str = "%Y-%m-%d";

/// Turn a scraped statement into a numeric table.
///
/// Empty cells become 0, the unnamed label column (if present) becomes the row
/// index, the currency row is dropped and every remaining cell is parsed as a
/// number. Text that does not parse becomes `Numeric::Missing`. A repeated
/// row label is rejected.
pub fn normalize(kind: StatementKind, raw: &RawStatement) -> MetricsResult<StatementTable> {
    let filled: Vec<Vec<RawCell>> = raw
        .rows
        .iter()
        .map(|row| row.iter().map(fill_empty).collect())
        .collect();

    let (labels, headers, data) = split_index(raw, filled);

    let periods = headers
        .iter()
        .map(|h| parse_period(kind, h))
        .collect::<MetricsResult<Vec<_>>>()?;

    if labels.len() != data.len() {
        return Err(MetricsError::RaggedRow {
            statement: kind,
            row: "index".to_string(),
            expected: data.len(),
            found: labels.len(),
        });
    }

    let mut rows = Vec::with_capacity(labels.len());
    for (label, cells) in labels.into_iter().zip(data) {
        if cells.len() != periods.len() {
            return Err(MetricsError::RaggedRow {
                statement: kind,
                row: label,
                expected: periods.len(),
                found: cells.len(),
            });
        }
        rows.push((label, cells));
    }

    if !rows.iter().any(|(label, _)| label == CURRENCY_ROW) {
        return Err(MetricsError::MissingRow {
            statement: kind,
            row: CURRENCY_ROW.to_string(),
        });
    }

    let table = rows
        .into_iter()
        .filter(|(label, _)| label != CURRENCY_ROW)
        .try_fold(StatementTable::new(kind, periods), |table, (label, cells)| {
            let values = cells.iter().map(coerce).collect();
            table.with_new_row(&label, values)
        })?;

    Ok(table.sorted_by_period())
}

fn fill_empty(cell: &RawCell) -> RawCell {
    match cell {
        RawCell::Empty => RawCell::Number(0.0),
        other => other.clone(),
    }
}

/// Separate row labels from data. Labels come from the explicit index, from
/// the unnamed first column, or fall back to row positions.
fn split_index(raw: &RawStatement, rows: Vec<Vec<RawCell>>) -> (Vec<String>, Vec<String>, Vec<Vec<RawCell>>) {
    if let Some(index) = &raw.index {
        return (index.clone(), raw.columns.clone(), rows);
    }

    if raw.columns.first().map(String::as_str) == Some(UNNAMED_INDEX) {
        let mut labels = Vec::with_capacity(rows.len());
        let mut data = Vec::with_capacity(rows.len());
        for mut row in rows {
            let label = if row.is_empty() { String::new() } else { cell_label(&row.remove(0)) };
            labels.push(label);
            data.push(row);
        }
        return (labels, raw.columns[1..].to_vec(), data);
    }

    let labels = (0..rows.len()).map(|i| i.to_string()).collect();
    (labels, raw.columns.clone(), rows)
}

fn cell_label(cell: &RawCell) -> String {
    match cell {
        RawCell::Text(s) => s.clone(),
        RawCell::Number(n) => n.to_string(),
        RawCell::Empty => String::new(),
    }
}

fn parse_period(kind: StatementKind, header: &str) -> MetricsResult<NaiveDate> {
    let trimmed = header.trim();
    // Headers exported with a time component ("2023-09-30 00:00:00")
    let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, PERIOD_FORMAT).map_err(|_| MetricsError::InvalidPeriod {
        statement: kind,
        label: header.to_string(),
    })
}

fn coerce(cell: &RawCell) -> Numeric {
    match cell {
        RawCell::Number(n) => Numeric::new(*n),
        RawCell::Text(s) => s.trim().parse::<f64>().map(Numeric::new).unwrap_or(Numeric::Missing),
        RawCell::Empty => Numeric::Missing,
    }
}
