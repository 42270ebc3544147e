pub mod csv;

pub use self::csv::{load_store_dir, load_table_csv};
