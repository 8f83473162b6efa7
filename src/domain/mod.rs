// Domain layer: core models, settings and ports (interfaces).

pub mod model;
pub mod ports;
pub mod settings;
