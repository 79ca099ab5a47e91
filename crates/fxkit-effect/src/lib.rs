//! Effect file parsing (MikuMikuEffect `.fx` / `.x` dialect).
//!
//! [`parse`] turns effect text into an [`Effect`]: macro definitions, typed parameters, static
//! variables, texture bindings promoted from defines, controller bindings, includes, techniques
//! with their passes, and the embedded shader functions. Parsing is permissive and total; lines
//! that match nothing are simply skipped (see [`classify_lines`] to inspect them).

mod annotation;
mod block;
mod ir;
mod line;
mod parser;
mod query;
mod report;
pub mod scan;
mod source;
mod texture;
mod validate;
pub mod value;

pub use annotation::parse_annotations;
pub use block::{is_keyword, KEYWORDS};
pub use ir::*;
pub use line::{classify_lines, ClassifiedLine, Declaration, DefineLine, LineKind};
pub use parser::{parse, ParseOptions, Parser};
pub use query::{diff, DefineChange, EffectDiff, Summary};
pub use report::{to_json, to_markdown};
pub use source::{file_name_of, load_and_parse, AssetLoader, FsLoader, LoadError, MemoryLoader};
pub use texture::{promote_textures, TextureConvention, TEXTURE_CONVENTIONS};
pub use validate::{validate, Validation};
pub use value::ParamValue;
