//! promconsole: page controllers and a terminal front end for a Prometheus
//! management backend (configuration, alerting rules, metrics, exports).

pub mod activity;
pub mod cli;
pub mod client;
pub mod config;
pub mod document;
pub mod editor;
pub mod notify;
pub mod page;
pub mod prompt;
