//! Loading of the suburb directory from CSV or JSON files.

pub mod loader;

pub use loader::{
    DirectoryFormat, DirectoryLoadError, SuburbRow, load_from_file, load_from_str, parse_csv,
    parse_json,
};
