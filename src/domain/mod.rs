//! Domain layer: pure data, pure services, and ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
