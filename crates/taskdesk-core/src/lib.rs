pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod filter_state;
pub mod form;
pub mod i18n;
pub mod notify;
pub mod query;
pub mod remote;
pub mod table;
pub mod transport;
pub mod url_state;
