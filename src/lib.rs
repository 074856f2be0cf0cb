pub mod api;
pub mod config;
pub mod i18n;
pub mod poll;
pub mod server;
pub mod sound;
pub mod studio;
#[doc(hidden)]
pub mod test_support;
pub mod theme;
pub mod topology;
