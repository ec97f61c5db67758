pub mod cassette;
pub mod keyboard;
pub mod serial;

pub use cassette::CassetteDeck;
pub use keyboard::KeyboardFifo;
pub use serial::SerialLink;
