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

//! # Stagehand Macros Crate
//!
//! This is a helper crate of Stagehand, a script discovery and modeling
//! engine. Depend on the main `stagehand` crate instead: it re-exports the
//! [script] attribute macro.
//!
//! The macro inspects Rust structs, impl blocks, and functions at compile
//! time and registers their descriptors in the module table that the
//! discovery engine reads at run time.
//!
//! ## Copyright
//!
//! This work is proprietary software with source-available code.
//!
//! To copy, use, distribute, or contribute to this work, you must agree to the
//! terms and conditions of the
//! [General License Agreement](https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md).
//!
//! Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин). All rights reserved.

mod script;
mod utils;

use proc_macro::TokenStream;
use quote::quote_spanned;
use syn::{parse_macro_input, spanned::Spanned};

use crate::script::ScriptItem;

/// Declares script modules, script types, and their members.
///
/// ## Modules
///
/// `#[script(module)]` on a unit struct declares a module. The module owns
/// every script type and every entry point function declared in the Rust
/// module of the struct and in its submodules. The macro implements the
/// `ScriptModule` trait on the struct.
///
/// ```ignore
/// /// Tools of the demo workspace.
/// #[script(module, name "demo", version "1.2.0")]
/// struct Module;
/// ```
///
/// The name and the version default to the crate's name and version, and the
/// description defaults to the struct's Rust documentation.
///
/// ## Script types
///
/// `#[script]` on a struct declares a script type. `#[derive(Default)]` on
/// the struct provides the parameterless constructor the discovery engine
/// needs to instantiate the script.
///
/// ```ignore
/// /// Waters the plants.
/// #[script(name "Gardener")]
/// #[derive(Default)]
/// struct Watering {
///     /// Liters per plant.
///     #[script(setting, group "Amounts", min 0.5, max 3, step 0.5)]
///     liters: f32,
///
///     #[script(sink)]
///     log: Option<Sink>,
/// }
/// ```
///
/// Field options:
///
/// - `setting`: a user-adjustable setting. The field type must be a script
///   value type. Accepts `name "..."`, `description "..."`, `group "..."`,
///   and `min <expr>`, `max <expr>`, `step <expr>` slider bounds.
/// - `sink`: the field receives the script's diagnostic sink. The field type
///   is `Sink` or `Option<Sink>`.
///
/// ## Impl blocks
///
/// `#[script]` on an impl block of a script type exports the marked methods:
///
/// ```ignore
/// #[script]
/// impl Watering {
///     #[script(setup, once)]
///     fn fill_can(&mut self) {}
///
///     #[script(entry_point)]
///     fn water(&self, signal: &Signal) -> usize { 3 }
///
///     #[script(cleanup)]
///     fn report(&self) {}
///
///     #[script(mini_script, group "Maintenance")]
///     fn sharpen_tools() {}
///
///     #[script(setting, setter set_days)]
///     fn days(&self) -> u8 { 7 }
///
///     fn set_days(&mut self, days: u8) {}
/// }
/// ```
///
/// Method options:
///
/// - `setup`, `entry_point`, `cleanup`: the lifecycle operations. `setup` and
///   `cleanup` accept `once`.
/// - `mini_script`: an ad hoc operation. Accepts `group "..."`.
/// - `setting`: a property setting backed by a getter method. The optional
///   `setter <method>` names a method of the same impl block.
///
/// Every method option accepts `name "..."` and `description "..."`. The
/// description defaults to the method's Rust documentation.
///
/// Public functions of an inherent impl block that take no receiver and
/// return the Self type become constructors. `#[script] impl Default` and
/// `#[script] impl Release` blocks register the parameterless constructor and
/// the release hook respectively.
///
/// ## Entry point functions
///
/// `#[script(entry_point)]` on a free function declares the program entry
/// point of the enclosing module. The discovery engine uses it when the module
/// has no script types.
///
/// ```ignore
/// #[script(entry_point)]
/// fn main(args: Vec<String>) {}
/// ```
///
/// ## Debugging
///
/// The `dump` option prints the generated code as a compile-time error. It is
/// available in debug builds only.
#[proc_macro_attribute]
pub fn script(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    let attr_span = attr.span();

    let input = TokenStream::from_iter(
        TokenStream::from(quote_spanned!(attr_span=> #[script(#attr)]))
            .into_iter()
            .chain(item),
    );

    let output = parse_macro_input!(input as ScriptItem);
    output.into()
}
