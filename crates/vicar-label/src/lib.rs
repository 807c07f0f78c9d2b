//! Reading, editing, and writing VICAR image labels.
//!
//! VICAR data files open with an ASCII label of `NAME=VALUE` parameters,
//! optionally continued in an EOL label after the image records. This crate
//! parses that text into an ordered, indexed [`VicarLabel`], supports
//! editing by name, occurrence, or position, and renders labels back out,
//! byte-identically for entries that were not modified. Labels can also be
//! rewritten in place inside an existing data file without disturbing the
//! image records.
//!
//! ```no_run
//! use vicar_label::VicarLabel;
//!
//! fn main() -> vicar_label::Result<()> {
//!     let mut label = VicarLabel::from_file("image.img")?;
//!     let lines = label.int("NL")?;
//!     label.set("TASK+", "STRETCH")?;
//!     label.set(("DAT_TIM", "TASK", "STRETCH"), "2024-01-01")?;
//!     label.write_label(None)?;
//!     println!("{lines} lines");
//!     Ok(())
//! }
//! ```

mod error;
mod grammar;
mod label;
mod reader;
mod render;
mod types;
mod writer;

pub use error::{Result, VicarError};
pub use grammar::parse_label_text;
pub use label::{LabelEntry, UniqueKey, VicarLabel};
pub use reader::{read_label, read_label_with_extra};
pub use types::{Key, ListFormat, Scalar, Value, ValueFormat, validate_name};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
