// Domain layer: models and ports (interfaces) shared by the connector and its adapters.

pub mod model;
pub mod ports;
