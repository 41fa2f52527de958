//! 具体渠道实现

pub mod console;
pub mod desktop;

pub use console::ConsoleChannel;
pub use desktop::DesktopChannel;
