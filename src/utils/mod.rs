pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;
pub mod logging;

pub use error::{
    DescriberError,
    DescriberResult,
    FormatError,
    PathError,
    PdfError,
    ServiceError,
    ValidationError,
};
pub use validation::validate_root_folder;
pub use formats::{ImageFormat, format_from_extension, is_accepted_image};
pub use fs::{
    create_dir_all,
    open_append,
    append_durably,
    replace_atomically,
    truncate_file,
    file_stem_string,
};
