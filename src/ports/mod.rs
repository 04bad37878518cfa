//! Port traits decoupling the domain from concrete data sources.

pub mod data_port;
