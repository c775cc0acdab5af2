/// Database layer for TeamBoard
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded schema migrations
///
/// Table access lives in [`crate::models`]; services reach it through
/// [`crate::store`].

pub mod migrations;
pub mod pool;
