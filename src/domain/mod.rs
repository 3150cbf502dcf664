// Domain layer: core models and ports (interfaces) to the wider game.

pub mod model;
pub mod ports;
