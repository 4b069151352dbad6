use crate::prelude::{StageError, StageResult};

/// Parses a two-column numeric text table.
///
/// Lines starting with `#` and blank lines are skipped; columns may be
/// separated by any whitespace or commas. Extra columns are ignored.
pub fn parse_two_column(text: &str, what: &str) -> StageResult<Vec<(f64, f64)>> {
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut columns = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|column| !column.is_empty());
        let first = parse_column(columns.next(), index, what)?;
        let second = parse_column(columns.next(), index, what)?;
        rows.push((first, second));
    }
    Ok(rows)
}

fn parse_column(column: Option<&str>, index: usize, what: &str) -> StageResult<f64> {
    let column = column.ok_or_else(|| {
        StageError::BadArgument(format!("{} line {}: expected two columns", what, index + 1))
    })?;
    column.parse::<f64>().map_err(|_| {
        StageError::BadArgument(format!(
            "{} line {}: '{}' is not a number",
            what,
            index + 1,
            column
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let rows = parse_two_column("# depth velocity\n\n0 1500\n10.5\t1498.2\n", "svp").unwrap();
        assert_eq!(rows, vec![(0.0, 1500.0), (10.5, 1498.2)]);
    }

    #[test]
    fn single_column_line_is_rejected() {
        let err = parse_two_column("0 1500\n12\n", "svp").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
