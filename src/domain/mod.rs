// Domain layer: core models and ports (interfaces). No knowledge of SQL or HTTP.

pub mod model;
pub mod ports;
