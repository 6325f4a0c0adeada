pub mod publisher;

pub use publisher::{TelegramPublisher, PARSE_MODE};

pub mod prelude {
    pub use super::publisher::TelegramPublisher;
    pub use nw_core::{Error, Publisher, Result};
}
