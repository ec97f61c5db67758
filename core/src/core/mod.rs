pub mod bus;
pub mod component;
pub mod machine;

pub use bus::Bus;
pub use component::{BusComponent, Component};
pub use machine::{DisplayView, Machine};
