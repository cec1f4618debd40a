pub mod postgres;

pub use postgres::PgSource;
