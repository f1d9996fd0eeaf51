pub mod hours;
pub mod log;
pub mod stop;
pub mod timeline;
pub mod trip;
