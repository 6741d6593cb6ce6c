pub mod reading_source;

pub use reading_source::ReadingSource;
