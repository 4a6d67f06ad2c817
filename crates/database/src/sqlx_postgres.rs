use sqlx::{FromRow, Postgres, Error as SqlxError, postgres::PgArguments, Executor};
use sqlx::types::Uuid;

pub type SqlxQueryAs<'q, R> = sqlx::query::QueryAs<'q, Postgres, R, PgArguments>;

/// Trait to define the schema of a database object for PostgreSQL.
///
/// `COLUMNS` must start with the `id` column. Every other column is bound by
/// `bind_fields` in the order it appears in `COLUMNS`.
pub trait SqlxSchema: Send + Sync + Unpin + Clone + std::fmt::Debug {
    /// The intermediate type that implements FromRow, used for fetching from the database.
    type Row: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin;

    const TABLE_NAME: &'static str;
    const ID_COLUMN_NAME: &'static str = "id";
    const COLUMNS: &'static [&'static str];
    const INDEXES_SQL: &'static [&'static str] = &[];

    /// Retrieves the value of the primary key for an instance of the object.
    fn get_id_value(&self) -> Uuid;

    /// Converts the intermediate Row type to the Self type.
    fn from_row(row: Self::Row) -> Self;

    /// Binds every non-id column, in `COLUMNS` order.
    fn bind_fields<'q>(&self, query: SqlxQueryAs<'q, Self::Row>) -> SqlxQueryAs<'q, Self::Row>;

    fn create_table_sql() -> String;

    fn drop_table_sql() -> String {
        format!("DROP TABLE IF EXISTS \"{}\" CASCADE", Self::TABLE_NAME)
    }

    fn insert_sql() -> String {
        insert_sql(Self::TABLE_NAME, Self::COLUMNS)
    }

    fn update_sql() -> String {
        update_sql(Self::TABLE_NAME, Self::ID_COLUMN_NAME, Self::COLUMNS)
    }

    fn trigger_sql() -> String {
        if !Self::COLUMNS.contains(&"updated_at") {
            return String::new();
        }
        format!(
            "DROP TRIGGER IF EXISTS {trigger} ON \"{table}\"; CREATE TRIGGER {trigger} BEFORE UPDATE ON \"{table}\" FOR EACH ROW EXECUTE PROCEDURE set_updated_at_unix_timestamp();",
            trigger = format!("set_updated_at_{}", Self::TABLE_NAME),
            table = Self::TABLE_NAME,
        )
    }
}

pub fn insert_sql(table: &str, columns: &[&str]) -> String {
    let column_list = quoted_columns(columns);
    let placeholders = (1..=columns.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO \"{table}\" ({column_list}) VALUES ({placeholders}) RETURNING {column_list}")
}

pub fn update_sql(table: &str, id_column: &str, columns: &[&str]) -> String {
    let assignments = columns.iter()
        .filter(|c| **c != id_column)
        .enumerate()
        .map(|(i, c)| format!("\"{}\" = ${}", c, i + 1))
        .collect::<Vec<_>>();
    let id_placeholder = assignments.len() + 1;
    format!(
        "UPDATE \"{table}\" SET {} WHERE \"{id_column}\" = ${id_placeholder} RETURNING {}",
        assignments.join(", "),
        quoted_columns(columns),
    )
}

fn quoted_columns(columns: &[&str]) -> String {
    columns.iter().map(|c| format!("\"{c}\"")).collect::<Vec<_>>().join(", ")
}

/// Trait for insert and update operations for PostgreSQL. Rows are never deleted by the application.
#[async_trait::async_trait]
pub trait SqlxCrud: SqlxSchema + SqlxFilterQuery + Sized {
    /// Creates a new record in the database.
    async fn create<'e, E>(self, executor: E) -> Result<Self, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        let sql = Self::insert_sql();
        let query = sqlx::query_as::<_, Self::Row>(&sql).bind(self.get_id_value());
        self.bind_fields(query)
            .fetch_one(executor)
            .await
            .map(Self::from_row)
    }

    /// Updates an existing record in the database (identified by its primary key).
    async fn update<'e, E>(self, executor: E) -> Result<Self, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        let sql = Self::update_sql();
        let query = sqlx::query_as::<_, Self::Row>(&sql);
        self.bind_fields(query)
            .bind(self.get_id_value())
            .fetch_one(executor)
            .await
            .map(Self::from_row)
    }
}

/// Specifies the direction for ordering query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

// --- Filtering Structures and Trait ---

/// A trait to allow for boxing of different types that can be encoded as sqlx arguments.
pub trait AsSqlxArg: Send + Sync {
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError>;
}

impl<T> AsSqlxArg for T
where
    T: for<'a> sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
{
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError> {
        use sqlx::Arguments;
        args.add(self.clone()).map_err(SqlxError::Encode)
    }
}

/// Represents a single filter condition for a database query.
pub struct FilterCondition {
    pub column: &'static str,
    pub operator: &'static str,
    /// Holds the value for the condition's placeholder, if any.
    pub value: Option<Box<dyn AsSqlxArg>>,
}

/// Represents the complete criteria for a filtered database query.
#[derive(Default)]
pub struct QueryCriteria {
    pub conditions: Vec<FilterCondition>,
    pub limit: Option<i64>,
    pub order_by: Vec<(&'static str, OrderDirection)>,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `"id" = <id>`.
    pub fn by_id(id: Uuid) -> Self {
        Self::new().add_valued_filter("id", "=", id)
    }

    /// Adds a filter condition that may or may not have a value.
    /// A `None` value renders the operator verbatim, e.g. `IS NULL`.
    pub fn add_filter<V>(mut self, column: &'static str, operator: &'static str, value: Option<V>) -> Self
    where
        V: for<'a> ::sqlx::Encode<'a, Postgres> + ::sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.conditions.push(FilterCondition {
            column,
            operator,
            value: value.map(|v| Box::new(v) as Box<dyn AsSqlxArg>),
        });
        self
    }

    pub fn add_valued_filter<V>(self, column: &'static str, operator: &'static str, value: V) -> Self
    where
        V: for<'a> ::sqlx::Encode<'a, Postgres> + ::sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.add_filter(column, operator, Some(value))
    }

    pub fn limit(mut self, limit_val: i64) -> Self {
        self.limit = Some(limit_val);
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: OrderDirection) -> Self {
        self.order_by.push((column, direction));
        self
    }

    /// Renders the WHERE / ORDER BY / LIMIT tail of a query.
    /// Placeholders are numbered in the order `bind_arguments` adds values.
    pub fn to_sql_tail(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut placeholder_idx = 1;

        let mut where_clauses = Vec::new();
        for condition in &self.conditions {
            let mut clause = format!("\"{}\" {}", condition.column, condition.operator);
            if condition.value.is_some() {
                clause.push_str(&format!(" ${placeholder_idx}"));
                placeholder_idx += 1;
            }
            where_clauses.push(clause);
        }
        if !where_clauses.is_empty() {
            parts.push(format!("WHERE {}", where_clauses.join(" AND ")));
        }

        if !self.order_by.is_empty() {
            let order_clauses = self.order_by.iter()
                .map(|(col, dir)| format!("\"{}\" {}", col, dir.as_sql()))
                .collect::<Vec<_>>();
            parts.push(format!("ORDER BY {}", order_clauses.join(", ")));
        }

        if self.limit.is_some() {
            parts.push(format!("LIMIT ${placeholder_idx}"));
        }

        parts.join(" ")
    }

    pub fn bind_arguments(&self) -> Result<PgArguments, SqlxError> {
        use sqlx::Arguments;
        let mut arguments = PgArguments::default();
        for condition in &self.conditions {
            if let Some(value) = &condition.value {
                value.add_to_args(&mut arguments)?;
            }
        }
        if let Some(limit_val) = self.limit {
            arguments.add(limit_val).map_err(SqlxError::Encode)?;
        }
        Ok(arguments)
    }

    pub fn to_select_sql(&self, table: &str, columns: &[&str]) -> String {
        let select = format!("SELECT {} FROM \"{}\"", quoted_columns(columns), table);
        let tail = self.to_sql_tail();
        if tail.is_empty() { select } else { format!("{select} {tail}") }
    }
}

/// Trait for finding records based on dynamic filter criteria.
#[async_trait::async_trait]
pub trait SqlxFilterQuery: SqlxSchema + Sized {
    async fn find_by_criteria<'e, E>(
        criteria: QueryCriteria,
        executor: E,
    ) -> Result<Vec<Self>, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        let sql = criteria.to_select_sql(Self::TABLE_NAME, Self::COLUMNS);
        let arguments = criteria.bind_arguments()?;
        tracing::trace!("[SqlxFilterQuery::find_by_criteria] {}", sql);

        sqlx::query_as_with::<_, Self::Row, _>(&sql, arguments)
            .fetch_all(executor)
            .await
            .map(|rows| rows.into_iter().map(Self::from_row).collect())
    }

    /// Finds a single optional record. Adds `LIMIT 1` unless a limit is already set.
    async fn find_one_by_criteria<'e, E>(
        mut criteria: QueryCriteria,
        executor: E,
    ) -> Result<Option<Self>, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        if criteria.limit.is_none() {
            criteria = criteria.limit(1);
        };
        let mut results = Self::find_by_criteria(criteria, executor).await?;
        Ok(results.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "title", "user_id", "created_at", "updated_at"];

    #[test]
    fn insert_sql_numbers_every_column() {
        assert_eq!(
            insert_sql("generated_stories", &["id", "title"]),
            "INSERT INTO \"generated_stories\" (\"id\", \"title\") VALUES ($1, $2) RETURNING \"id\", \"title\""
        );
    }

    #[test]
    fn update_sql_binds_id_last() {
        let sql = update_sql("generated_stories", "id", COLUMNS);
        assert!(sql.starts_with("UPDATE \"generated_stories\" SET \"title\" = $1, \"user_id\" = $2"));
        assert!(sql.contains("WHERE \"id\" = $5"));
    }

    #[test]
    fn select_sql_with_filters_order_and_limit() {
        let criteria = QueryCriteria::new()
            .add_valued_filter("user_id", "=", Uuid::nil())
            .add_filter::<String>("image_url", "IS NOT NULL", None)
            .order_by("created_at", OrderDirection::Desc)
            .limit(10);

        assert_eq!(
            criteria.to_select_sql("characters", &["id", "name"]),
            "SELECT \"id\", \"name\" FROM \"characters\" WHERE \"user_id\" = $1 AND \"image_url\" IS NOT NULL ORDER BY \"created_at\" DESC LIMIT $2"
        );
    }

    #[test]
    fn select_sql_without_criteria() {
        assert_eq!(
            QueryCriteria::new().to_select_sql("characters", &["id"]),
            "SELECT \"id\" FROM \"characters\""
        );
    }
}
