// devices/mod.rs
mod smart_lamp;
pub use smart_lamp::SmartLamp;
