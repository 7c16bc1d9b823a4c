// Adapters layer: concrete implementations of the domain ports (http transport, error reporting).

pub mod http;
pub mod reporter;
