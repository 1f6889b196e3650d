//! Ad-hoc SQL over the store, and the built-in duplicates report.

use rusqlite::Connection;
use rusqlite::types::ValueRef;

use super::DUPLICATES_SQL;

/// Result of one query, every cell already rendered as text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryTable {
    pub query: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => b.iter().map(|byte| format!("{byte:02x}")).collect(),
    }
}

/// Run one statement and collect every row.
pub fn run_query(conn: &Connection, sql: &str) -> rusqlite::Result<QueryTable> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(cell_to_string(row.get_ref(i)?));
        }
        out.push(cells);
    }
    Ok(QueryTable {
        query: sql.trim().to_string(),
        columns,
        rows: out,
    })
}

/// One set of identical files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub hash: String,
    pub count: i64,
    pub size: Option<i64>,
}

/// Every hash stored under more than one path, largest groups first.
pub fn duplicate_groups(conn: &Connection) -> rusqlite::Result<Vec<DuplicateGroup>> {
    let mut stmt = conn.prepare(DUPLICATES_SQL)?;
    let groups = stmt
        .query_map([], |row| {
            Ok(DuplicateGroup {
                hash: row.get(0)?,
                count: row.get(1)?,
                size: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(groups)
}

/// The duplicates report as a printable table (`hash`, `count`, `size`).
pub fn duplicates_table(conn: &Connection) -> rusqlite::Result<QueryTable> {
    let rows = duplicate_groups(conn)?
        .into_iter()
        .map(|g| {
            vec![
                g.hash,
                g.count.to_string(),
                g.size.map_or_else(|| "NULL".to_string(), |s| s.to_string()),
            ]
        })
        .collect();
    Ok(QueryTable {
        query: "duplicates".to_string(),
        columns: vec!["hash".to_string(), "count".to_string(), "size".to_string()],
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_value_type() {
        let conn = Connection::open_in_memory().unwrap();
        let table = run_query(&conn, "SELECT NULL AS n, 7 AS i, 1.5 AS r, 'x' AS t, x'0aff' AS b")
            .unwrap();
        assert_eq!(table.columns, vec!["n", "i", "r", "t", "b"]);
        assert_eq!(table.rows, vec![vec!["NULL", "7", "1.5", "x", "0aff"]]);
    }

    #[test]
    fn duplicates_table_lists_only_shared_hashes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE entries (hash TEXT, path TEXT, size INTEGER);
             INSERT INTO entries VALUES ('aa', '/a', 3), ('aa', '/b', 3), ('bb', '/c', 1);",
        )
        .unwrap();
        let table = duplicates_table(&conn).unwrap();
        assert_eq!(table.columns, vec!["hash", "count", "size"]);
        assert_eq!(table.rows, vec![vec!["aa", "2", "3"]]);
    }

    #[test]
    fn bad_sql_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(run_query(&conn, "SELEKT 1").is_err());
    }
}
