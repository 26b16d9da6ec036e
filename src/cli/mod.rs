mod output_writer;
mod text_loader;
mod validators;

pub use output_writer::write_output;
pub use text_loader::load_text;
pub use validators::{validate_file_exists, validate_non_empty, validate_timeout};
