pub mod connections;
pub mod ddl;
pub mod oauth;
pub mod schema;
