pub mod clock;
pub mod code_generator;
pub mod url_validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use code_generator::{CodeGenerator, generate_random_code};
pub use url_validator::{UrlValidationError, normalize_url, validate_url};
