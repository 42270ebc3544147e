pub mod csv;

pub use self::csv::{write_store_dir, write_table_csv};
