mod alter_field;
mod arrays;
mod indices;
mod limits;
mod simple;
mod table_info;
mod transactions;
mod upsert;

#[cfg(not(feature = "disable-alter-field"))]
use crate::alter_field::alter_field;
#[cfg(not(feature = "disable-transactions"))]
use crate::transactions::transactions;
use crate::{
    arrays::arrays, indices::indices, limits::limits, simple::simple, table_info::table_info,
    upsert::upsert,
};
use log::LevelFilter;
use quarry::{Connection, Driver, Order, Params, Query, Row, Select};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run every behavioural check against `connection`.
///
/// Each check owns a `quarry_*` table, dropped and recreated on start.
pub fn execute_tests<D: Driver>(mut connection: Connection<D>) {
    simple(&mut connection);
    upsert(&mut connection);
    indices(&mut connection);
    table_info(&mut connection);
    arrays(&mut connection);
    limits(&mut connection);
    #[cfg(not(feature = "disable-transactions"))]
    transactions(&mut connection);
    #[cfg(not(feature = "disable-alter-field"))]
    alter_field(&mut connection);
}

pub(crate) fn select_all<D: Driver>(connection: &mut Connection<D>, table: &str) -> Vec<Row> {
    connection
        .fetch(
            &Query::new(Select::new(table.to_string()).order_by("id", Order::Asc)),
            &Params::new(),
        )
        .unwrap_or_else(|e| panic!("Failed to read the {} table: {}", table, e))
}

pub(crate) fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter()
        .map(|row| row.get_as::<i64>("id").expect("The id column should be an integer"))
        .collect()
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
