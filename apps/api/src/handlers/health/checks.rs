use redis::AsyncCommands;

use crate::dto::DependencyHealth;

pub(super) async fn check_postgres(pool: Option<sqlx::PgPool>) -> DependencyHealth {
    let Some(pool) = pool else {
        return DependencyHealth::disabled();
    };

    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&pool).await {
        Ok(_) => DependencyHealth::ok(),
        Err(error) => DependencyHealth::error(format!("postgres check failed: {error}")),
    }
}

/// Redis is only configured when it backs the rate limiter.
pub(super) async fn check_redis(redis_client: Option<redis::Client>) -> DependencyHealth {
    let Some(redis_client) = redis_client else {
        return DependencyHealth::disabled();
    };

    let mut connection = match redis_client.get_multiplexed_async_connection().await {
        Ok(connection) => connection,
        Err(error) => return DependencyHealth::error(format!("redis connection failed: {error}")),
    };

    match connection.ping::<String>().await {
        Ok(reply) if reply.eq_ignore_ascii_case("pong") => DependencyHealth::ok(),
        Ok(reply) => DependencyHealth::error(format!("unexpected redis ping reply: {reply}")),
        Err(error) => DependencyHealth::error(format!("redis ping failed: {error}")),
    }
}
