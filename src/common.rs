pub mod csv_export;
pub mod datas;
pub mod error;
