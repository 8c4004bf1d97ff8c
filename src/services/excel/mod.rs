pub mod reader;
pub mod types;
pub mod utils;
pub mod writer;

pub use reader::SheetReader;
pub use writer::SheetWriter;
pub use utils::{report_file_name, validate_file_name};
