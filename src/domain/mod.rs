// Domain layer: the news record shape and the adapter port. No I/O here.

pub mod model;
pub mod ports;
