// Domain layer: unit model and the conversion ports. Only std/serde here.

pub mod model;
pub mod ports;
