/// Initializes the database connection pool for the application.
///
/// Creates and configures the default pool and, when asked to, creates the
/// tables (plus `updated_at` triggers and indexes) for the listed types.
///
/// # Generated Functions
/// - `async fn connect(drop_tables: bool, create_tables: bool) -> anyhow::Result<&'static PgPool>`
///
/// # Example
/// ```rust,ignore
/// init_databases!(
///     default: [Character, Story]
/// );
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let pool = connect(false, true).await?;
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! init_databases {
    (
        default: [$($default_type:ty),* $(,)?]
    ) => {
        static POOL: tokio::sync::OnceCell<sqlx::PgPool> = tokio::sync::OnceCell::const_new();

        async fn connect(drop_tables: bool, create_tables: bool) -> anyhow::Result<&'static sqlx::PgPool> {
            POOL.get_or_try_init(|| async {
                let database_url = std::env::var("DATABASE_URL")
                    .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;

                let pool = sqlx::PgPool::connect(&database_url).await?;

                if drop_tables {
                    $(
                        let drop_table_sql_str = <$default_type as $crate::SqlxSchema>::drop_table_sql();
                        if let Err(e) = sqlx::query(&drop_table_sql_str).execute(&pool).await {
                            tracing::warn!("Failed to drop table for '{}'. Error: {:?}", stringify!($default_type), e);
                        }
                    )*
                }

                if create_tables {
                    let trigger_func_sql = r#"
                    CREATE OR REPLACE FUNCTION set_updated_at_unix_timestamp()
                    RETURNS TRIGGER AS $$
                    BEGIN NEW.updated_at = floor(extract(epoch from now())); RETURN NEW; END;
                    $$ language 'plpgsql';
                    "#;
                    sqlx::query(trigger_func_sql).execute(&pool).await?;

                    $(
                        let create_table_sql_str = <$default_type as $crate::SqlxSchema>::create_table_sql();
                        sqlx::query(&create_table_sql_str).execute(&pool).await
                            .map_err(|e| anyhow::anyhow!("Failed to create table for '{}'. Error: {:?}", stringify!($default_type), e))?;
                    )*

                    $(
                        let trigger_sql_str = <$default_type as $crate::SqlxSchema>::trigger_sql();
                        for statement in trigger_sql_str.split(';').filter(|s| !s.trim().is_empty()) {
                            sqlx::query(statement).execute(&pool).await
                                .map_err(|e| anyhow::anyhow!("Failed to execute trigger for '{}'. SQL: {}. Error: {:?}", stringify!($default_type), statement, e))?;
                        }
                    )*

                    $(
                        for index_sql in <$default_type as $crate::SqlxSchema>::INDEXES_SQL {
                            sqlx::query(index_sql).execute(&pool).await
                                .map_err(|e| anyhow::anyhow!("Failed to create index for '{}'. SQL: {}. Error: {:?}", stringify!($default_type), index_sql, e))?;
                        }
                    )*
                    tracing::info!("[init_databases] tables ready");
                }

                Ok::<_, anyhow::Error>(pool)
            }).await
        }
    };
}
