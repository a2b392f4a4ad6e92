// Domain layer: core models and ports (interfaces). No engine or transport code here.

pub mod model;
pub mod ports;
