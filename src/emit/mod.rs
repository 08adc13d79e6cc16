pub mod csv_file;
pub mod xlsx;

pub use csv_file::write_csv;
pub use xlsx::{write_workbook, Sheet};
