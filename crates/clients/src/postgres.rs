use sqlx::PgPool;
use storytime_common::{define_module_client, ModuleClient};

define_module_client! {
    (struct PostgresClient, "postgres")
    client_type: PgPool,
    env: ["DATABASE_URL"],
    setup: async {
        let database_url = std::env::var("DATABASE_URL")?;
        Ok::<_, anyhow::Error>(PgPool::connect(&database_url).await?)
    }
}

impl PostgresClient {
    pub fn pool(&self) -> &PgPool {
        self.get_client().as_ref()
    }
}
