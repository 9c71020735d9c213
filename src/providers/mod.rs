pub mod http;
pub mod json_daily;
pub mod util;
pub mod xml_daily;

#[cfg(test)]
pub(crate) mod fixtures;

pub use json_daily::JsonDailySource;
pub use xml_daily::XmlDailySource;
