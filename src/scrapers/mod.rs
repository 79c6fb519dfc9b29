pub mod browser;
pub mod collector;
pub mod listing;
pub mod session;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use browser::ChromeDriver;
pub use collector::ReviewCollector;
pub use session::ExtractionSession;
