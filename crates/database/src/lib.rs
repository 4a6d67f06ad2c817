mod sqlx_postgres;
mod postgres_connect;

pub use sqlx_postgres::*;
