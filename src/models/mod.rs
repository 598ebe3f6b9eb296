pub mod images;
pub mod uploads;
