// Domain layer: OpenGIN models and the query port. No HTTP here.

pub mod codec;
pub mod model;
pub mod ports;
