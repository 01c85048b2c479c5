mod discord_port;
mod image_board_port;

pub use discord_port::{DiscordPort, FetchMessagesOptions};
pub use image_board_port::ImageBoardPort;

#[cfg(test)]
pub mod mocks {
    pub use super::discord_port::MockDiscordPort;
    pub use super::image_board_port::MockImageBoardPort;
}
