////////////////////////////////////////////////////////////////////////////////
// This file is part of "Stagehand", a script discovery and modeling          //
// engine.                                                                    //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
};

static NIL_RUST_ORIGIN: RustOrigin = RustOrigin {
    package: None,
    code: None,
};

/// A pointer to a specific location in the Rust source code.
///
/// This object points to the place where an annotated Rust item (a script
/// type, an operation, a setting, or a module declaration) was declared.
///
/// Typically, you don't need to create this object manually. The
/// [script](crate::script) macro generates static instances of RustOrigin
/// during the introspection of Rust items. Metadata created manually uses
/// the [nil](RustOrigin::nil) origin.
///
/// The discovery engine orders declarations by their origins, so that the
/// "first discovered" operation of a kind is the one declared first in the
/// source code.
#[derive(Clone, Copy, Hash)]
pub struct RustOrigin {
    /// The name and version of the crate to which the Rust file belongs.
    pub package: Option<(&'static str, &'static str)>,

    /// The actual reference to the Rust file within the crate.
    pub code: Option<RustCode>,
}

impl Default for RustOrigin {
    #[inline(always)]
    fn default() -> Self {
        NIL_RUST_ORIGIN
    }
}

impl PartialEq for RustOrigin {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.package == other.package && self.code == other.code
    }
}

impl Eq for RustOrigin {}

impl Ord for RustOrigin {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.package
            .cmp(&other.package)
            .then_with(|| self.code.cmp(&other.code))
    }
}

impl PartialOrd for RustOrigin {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Debug for RustOrigin {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.package.is_none() && self.code.is_none() {
            return formatter.write_str("RustOrigin(nil)");
        }

        let mut debug_struct = formatter.debug_struct("RustOrigin");

        if let Some((name, version)) = &self.package {
            debug_struct.field("package", &format_args!("{name}@{version}"));
        }

        if let Some(code) = &self.code {
            debug_struct.field("code", &code);
        }

        debug_struct.finish()
    }
}

impl Display for RustOrigin {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = &self.code {
            return Display::fmt(code, formatter);
        }

        if let Some((name, _)) = self.package {
            return formatter.write_str(name);
        }

        formatter.write_str("[?]")
    }
}

impl RustOrigin {
    /// Returns a RustOrigin that intentionally does not point to any Rust code.
    /// This is the [Default] value of this object.
    #[inline(always)]
    pub fn nil() -> &'static Self {
        &NIL_RUST_ORIGIN
    }

    /// Returns true if this instance is the [Nil RustOrigin](Self::nil).
    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        self == &NIL_RUST_ORIGIN
    }

    /// Returns the Rust module path of the pointed item, if known.
    #[inline(always)]
    pub fn module_path(&self) -> Option<&'static str> {
        Some(self.code?.module)
    }

    /// This function is guaranteed to panic with the provided `message`.
    ///
    /// Unlike a normal `panic!`, the stack trace for this panic will typically
    /// start from the Rust code that this RustOrigin points to.
    #[inline(never)]
    pub fn blame<T>(&self, message: &str) -> T {
        if let Some(code) = self.code {
            (code.blame_fn)(message);
        }

        match self.package {
            Some((name, _)) => panic!("{}: {}", name, message),
            None => panic!("{}", message),
        }
    }
}

/// A component of [RustOrigin] that indicates a specific location in the Rust
/// source code.
#[derive(Clone, Copy)]
pub struct RustCode {
    /// The path of the Rust module (as returned by `module_path!()`).
    pub module: &'static str,

    /// A one-based line number within the module file.
    pub line: u32,

    /// A one-based column number within a line of the module file.
    pub column: u32,

    /// A function that panics at the location of the pointed Rust construct
    /// with the specified error message.
    pub blame_fn: fn(&str),
}

impl Hash for RustCode {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialEq for RustCode {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RustCode {}

impl Ord for RustCode {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for RustCode {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Debug for RustCode {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RustCode")
            .field("module", &self.module)
            .field("position", &format_args!("{}", self.span_string()))
            .finish()
    }
}

impl Display for RustCode {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{} [{}]", self.module, self.span_string()))
    }
}

impl RustCode {
    /// Similar to [RustOrigin::blame]. Refer to its documentation for details.
    #[inline(never)]
    pub fn blame(&self, message: &str) {
        (self.blame_fn)(message);
        panic!("{}: {}", self, message);
    }

    // The blame function does not take part in comparisons.
    #[inline(always)]
    fn key(&self) -> (&'static str, u32, u32) {
        (self.module, self.line, self.column)
    }

    /// A helper function that formats the line and column in the canonical
    /// end-user-facing form of `[<line>]:[<column>]`.
    pub fn span_string(&self) -> String {
        format!("{}:{}", self.line, self.column)
    }
}
