pub mod classify;
pub mod detector;
pub mod errors;
pub mod memory;
pub mod model;
pub mod ports;

pub use classify::{classify, FieldRole};
pub use detector::{
    analyze_form, detect_forms, extract_credentials, fill_login_form, find_login_form,
    write_value,
};
pub use errors::DocumentError;
pub use memory::{DocumentFixture, FieldFixture, FormFixture, StaticDocument};
pub use model::{DetectedForm, FieldSnapshot, FillOutcome, FormSnapshot, LoginCredentials};
pub use ports::PageDocument;
