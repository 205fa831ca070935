pub mod scanner;

pub use scanner::locate_repositories;
