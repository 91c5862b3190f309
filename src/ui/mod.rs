pub mod card_view;
pub mod layout;
pub mod terminal;

pub use terminal::TerminalDisplay;
