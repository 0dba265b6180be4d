// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error type shared by every morphic crate.
//!
//! Only failures that abort an operation are represented here. A value that
//! cannot be coerced to its target type is not an error: the converter layer
//! logs it and substitutes the target's default (see
//! [`Converter::decode`](crate::converter::Converter::decode)).

use std::borrow::Cow;

use thiserror::Error;

/// Set MORPHIC_PANIC_ON_ERROR at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("MORPHIC_PANIC_ON_ERROR").is_some();

/// Check if MORPHIC_PANIC_ON_ERROR environment variable is set.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for schema construction and production passes.
///
/// # Always Use Static Constructor Functions
///
/// Build errors through [`Error::resolution`], [`Error::protocol`] and the
/// other constructors rather than through the enum syntax, so that
/// `MORPHIC_PANIC_ON_ERROR` can stop at the creation site:
///
/// ```rust
/// use morphic_core::error::Error;
///
/// let err = Error::protocol("unexpected '}' at position 12");
/// let err = Error::resolution(format!("no converter for field '{}'", "owner"));
/// ```
///
/// ## Debug Mode: MORPHIC_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 MORPHIC_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No converter could be resolved, or a shape cannot be described.
    ///
    /// Raised while a schema is built; the shape is not cached.
    #[error("{0}")]
    Resolution(Cow<'static, str>),

    /// Malformed input or misuse of the entry protocol during `produce()`.
    #[error("{0}")]
    Protocol(Cow<'static, str>),

    /// A schema definition names something the shape does not have, or an
    /// override does not fit the field it is attached to.
    #[error("{0}")]
    Configuration(Cow<'static, str>),

    /// Container nesting went past the configured limit.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// An erased value or converter was used with the wrong Rust type.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
    },

    /// Generic unknown error.
    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::Resolution`].
    ///
    /// # Example
    /// ```
    /// use morphic_core::error::Error;
    ///
    /// let err = Error::resolution("Point has no selected fields");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn resolution<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Resolution(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Protocol`].
    ///
    /// # Example
    /// ```
    /// use morphic_core::error::Error;
    ///
    /// let err = Error::protocol(format!("unexpected end of input at {}", 7));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn protocol<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Protocol(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Configuration`].
    ///
    /// # Example
    /// ```
    /// use morphic_core::error::Error;
    ///
    /// let err = Error::configuration("property 'age' is not declared on Person");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn configuration<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Configuration(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DepthExceed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TypeMismatch`] naming both Rust types.
    ///
    /// # Example
    /// ```
    /// use morphic_core::error::Error;
    ///
    /// let err = Error::type_mismatch(std::any::type_name::<i32>(), "alloc::string::String");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<E, F>(expected: E, found: F) -> Self
    where
        E: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
    {
        let err = Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        };
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Unknown`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unknown(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Whether this error was raised while building a converter rather than
    /// while running a production pass.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Error::Resolution(_) | Error::Configuration(_) | Error::TypeMismatch { .. }
        )
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use morphic_core::ensure;
/// use morphic_core::error::Error;
///
/// fn check_depth(depth: u32, max: u32) -> Result<(), Error> {
///     ensure!(depth <= max, Error::depth_exceed(format!("{} > {}", depth, max)));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with a [`Error::Protocol`].
///
/// # Examples
/// ```
/// use morphic_core::bail;
/// use morphic_core::error::Error;
///
/// fn expect_colon(c: char, at: usize) -> Result<(), Error> {
///     if c != ':' {
///         bail!("expected ':' at position {}, found '{}'", at, c);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::protocol($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::protocol(format!($fmt, $($arg)*)))
    };
}
