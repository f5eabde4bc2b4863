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

//! # Stagehand
//!
//! Stagehand is a script discovery and modeling engine.
//!
//! A host application (an editor, a tool runner, or a task panel) loads
//! a module of Rust code that contains "scripts": types annotated with
//! `#[script]` that expose a lifecycle (setup, entry point, cleanup), ad hoc
//! mini scripts, and user-adjustable settings. Stagehand finds these types,
//! instantiates them, and builds a [ScriptAssembly](model::ScriptAssembly):
//! a structured model that the host can present and invoke.
//!
//! ```
//! use stagehand::{discovery::AssemblyBuilder, runtime::ScriptModule, script};
//!
//! #[script(module)]
//! struct Module;
//!
//! /// Greets the user.
//! #[script]
//! #[derive(Default)]
//! struct Greeter {
//!     #[script(setting, min 1, max 5)]
//!     repeat: u8,
//! }
//!
//! #[script]
//! impl Greeter {
//!     #[script(entry_point)]
//!     fn greet(&self) -> String {
//!         "Hello ".repeat(self.repeat as usize)
//!     }
//! }
//!
//! let assembly = AssemblyBuilder::default().parse(Some(Module::meta())).unwrap();
//! let greeter = &assembly.scripts()[0];
//!
//! assert_eq!(greeter.name(), "Greeter");
//! assert_eq!(greeter.description(), Some("Greets the user."));
//!
//! greeter.setting("repeat").unwrap().set(2).unwrap();
//!
//! assert_eq!(
//!     greeter.entry_point().unwrap().invoke(None).unwrap().to_string(),
//!     "Hello Hello ",
//! );
//! ```
//!
//! The crate consists of the following modules:
//!
//! - [runtime]: the descriptor table of a module, typed values, and the
//!   compatibility engine that converts between value kinds.
//! - [discovery]: the [AssemblyBuilder](discovery::AssemblyBuilder) that
//!   turns a module's descriptors into a script model.
//! - [model]: the discovered scripts, their invocable members, and settings.
//! - [sink]: per-script diagnostic output channels.
//!
//! The [script] attribute macro produces the module descriptors at compile
//! time. The descriptors can also be assembled manually (see
//! [ModuleMeta](runtime::ModuleMeta)).
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

extern crate self as stagehand;

pub mod discovery;
pub mod model;
pub mod runtime;
pub mod sink;

pub use stagehand_export::script;
