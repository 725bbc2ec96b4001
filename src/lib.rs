//! A WebAssembly toolkit: parse the text format, decode and encode the
//! binary format, validate against a set of feature flags, and print
//! modules back as text. All entry points share one IR, [`Module`].

#[cfg(test)]
mod test;

pub mod decoder;
pub mod encoder;
pub mod features;
pub mod instr;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod printer;
pub mod types;
pub mod validator;

pub use decoder::{decode, DecodeError};
pub use encoder::encode;
pub use features::Features;
pub use module::Module;
pub use parser::{parse, ParseError};
pub use printer::print as print_module;
pub use validator::{validate as validate_module, Diagnostic};

use thiserror::Error;

/// Everything the byte-level entry points can fail with. Validation
/// keeps its diagnostics; the other two kinds pass through unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("module does not validate")]
    Validation(Vec<Diagnostic>),
}

/// Parses text and returns the canonical binary encoding.
pub fn parse_str(src: &str) -> Result<Vec<u8>, ParseError> {
    Ok(encode(&parse(src)?))
}

/// Accepts either form: a buffer with the `\0asm` magic is decoded and
/// re-encoded canonically, anything else is treated as UTF-8 text.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    if bytes.starts_with(b"\0asm") {
        return Ok(encode(&decode(bytes)?));
    }
    let src = std::str::from_utf8(bytes).map_err(|error| DecodeError {
        msg: "neither a binary module nor UTF-8 text".to_string(),
        offset: error.valid_up_to(),
    })?;
    Ok(encode(&parse(src)?))
}

/// Decodes a binary module and renders it as text.
pub fn print_bytes(bytes: &[u8]) -> Result<String, DecodeError> {
    Ok(printer::print(&decode(bytes)?))
}

/// Validates a binary module. A buffer that does not decode fails with
/// the decode error itself, not a diagnostic.
pub fn validate(bytes: &[u8], features: &Features) -> Result<(), Error> {
    let module = decode(bytes)?;
    validator::validate(&module, features).map_err(Error::Validation)
}
