//! Postgres table sink.
//!
//! `replace_table` runs as one transaction: drop, create from
//! [`refined_schema`], index the row key, insert every row. A failure
//! anywhere rolls back and leaves the previous table in place.

use super::{StoreError, TableSink};
use crate::domain::RefinedRow;
use crate::schema::{passthrough_columns, refined_schema, Cell, SchemaField, ROW_KEY};
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tracing::{debug, info};

pub struct PostgresSink {
    client: Client,
}

impl PostgresSink {
    pub fn connect(uri: &str) -> Result<Self, StoreError> {
        let client = Client::connect(uri, NoTls)?;
        Ok(Self { client })
    }
}

impl TableSink for PostgresSink {
    fn replace_table(&mut self, table: &str, rows: &[RefinedRow]) -> Result<usize, StoreError> {
        let fields = refined_schema(rows);
        let passthrough = passthrough_columns(rows);

        let mut tx = self.client.transaction()?;
        tx.batch_execute(&drop_table_sql(table))?;
        tx.batch_execute(&create_table_sql(table, &fields))?;
        tx.batch_execute(&create_index_sql(table))?;

        let statement = tx.prepare(&insert_sql(table, &fields))?;
        for row in rows {
            let cells = row.cells(&passthrough);
            let params: Vec<Box<dyn ToSql + Sync + '_>> = cells.iter().map(cell_param).collect();
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p.as_ref()).collect();
            tx.execute(&statement, &refs)?;
        }
        tx.commit()?;

        info!(table, rows = rows.len(), columns = fields.len(), "replaced table");
        Ok(rows.len())
    }
}

fn cell_param<'a>(cell: &Cell<'a>) -> Box<dyn ToSql + Sync + 'a> {
    match *cell {
        Cell::Date(d) => Box::new(d),
        Cell::Text(s) => Box::new(s),
        Cell::Float64(v) => Box::new(v),
        Cell::Int64(v) => Box::new(v),
        Cell::Json(v) => Box::new(v),
    }
}

/// Double-quoted SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

pub fn create_table_sql(table: &str, fields: &[SchemaField]) -> String {
    let columns: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", quote_ident(&f.name), f.dtype.sql_type()))
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        columns.join(", ")
    )
}

pub fn create_index_sql(table: &str) -> String {
    format!(
        "CREATE INDEX {} ON {} ({})",
        quote_ident(&format!("ix_{table}_{ROW_KEY}")),
        quote_ident(table),
        quote_ident(ROW_KEY)
    )
}

pub fn insert_sql(table: &str, fields: &[SchemaField]) -> String {
    let columns: Vec<String> = fields.iter().map(|f| quote_ident(&f.name)).collect();
    let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("${i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    );
    debug!(%sql, "prepared insert");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;
    use chrono::NaiveDate;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("refined_news"), "\"refined_news\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn create_table_lists_every_column_with_its_type() {
        let sql = create_table_sql("refined_news", &refined_schema(&[]));
        assert!(sql.starts_with("CREATE TABLE \"refined_news\" (\"date\" DATE, \"author\" TEXT"));
        assert!(sql.contains("\"close\" DOUBLE PRECISION"));
        assert!(sql.contains("\"volume\" BIGINT"));
        assert!(sql.ends_with("\"source_name\" TEXT)"));
    }

    #[test]
    fn passthrough_columns_are_jsonb() {
        let rows = vec![RefinedRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            extra: vec![("lang".into(), serde_json::json!("en"))],
            ..RefinedRow::default()
        }];
        let fields = refined_schema(&rows);
        assert!(fields.iter().any(|f| f.name == "lang" && f.dtype == SchemaType::Json));
        assert!(create_table_sql("t", &fields).contains("\"lang\" JSONB"));
    }

    #[test]
    fn index_is_on_the_row_key() {
        assert_eq!(
            create_index_sql("refined_news"),
            "CREATE INDEX \"ix_refined_news_date\" ON \"refined_news\" (\"date\")"
        );
    }

    #[test]
    fn insert_has_one_placeholder_per_column() {
        let fields = refined_schema(&[]);
        let sql = insert_sql("refined_news", &fields);
        assert!(sql.contains(&format!("${}", fields.len())));
        assert!(!sql.contains(&format!("${}", fields.len() + 1)));
    }

    #[test]
    fn drop_is_conditional() {
        assert_eq!(drop_table_sql("refined_news"), "DROP TABLE IF EXISTS \"refined_news\"");
    }
}
