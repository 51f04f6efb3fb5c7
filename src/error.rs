use thiserror::Error;

/// Failures raised by the binding layer itself, plus forwarded native codes.
///
/// The facade only originates errors for interop-resource problems (missing
/// dispatch table, unresolved symbols, null handles). Everything the native
/// side reports — bad ranges, degenerate inputs, unsupported formats —
/// arrives as [`Error::Native`] with the code untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// The dispatch table has not been initialized; call `cvextern::init`
    /// (or install a table) before invoking any operation.
    #[error("native library not loaded")]
    NotLoaded,

    /// The shared library could not be opened.
    #[error("failed to load native library: {0}")]
    Library(String),

    /// A required entry point was missing from the shared library.
    #[error("missing native symbol `{symbol}`: {reason}")]
    Symbol {
        symbol: &'static str,
        reason: String,
    },

    /// The struct-size handshake disagreed with this crate's layout.
    #[error("ABI mismatch for `{name}`: native reports {native} bytes, crate has {expected}")]
    AbiMismatch {
        name: &'static str,
        native: u32,
        expected: u32,
    },

    /// Handle resolution produced a null handle for a required argument,
    /// e.g. a disposed or never-created container.
    #[error("null handle passed to `{op}`")]
    NullHandle { op: &'static str },

    /// The native routine reported a failure. The code is whatever the
    /// native side returned through its status channel.
    #[error("native call `{op}` failed with code {code}")]
    Native { op: &'static str, code: i32 },
}

pub type Result<T> = std::result::Result<T, Error>;
