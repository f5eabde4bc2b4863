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

use proc_macro2::{Ident, TokenStream, TokenTree};
use quote::ToTokens;
use syn::{Type, TypePath};

use crate::utils::PathUtils;

/// The type of an operation parameter as far as the discovery engine is
/// concerned.
pub enum ParamShape {
    Signal { by_ref: bool },
    Strings,
    Other(String),
}

pub trait TypeUtils {
    fn param_shape(&self) -> ParamShape;

    fn is_self_type(&self, this: &Ident) -> bool;

    fn is_unit(&self) -> bool;

    fn display_name(&self) -> String;
}

impl TypeUtils for Type {
    fn param_shape(&self) -> ParamShape {
        match unwrap_groups(self) {
            Type::Reference(reference) if reference.mutability.is_none() => {
                if let Some(path) = plain_path(&reference.elem) {
                    if path.path.matches_signal().is_some() {
                        return ParamShape::Signal { by_ref: true };
                    }
                }
            }

            ty => {
                if let Some(path) = plain_path(ty) {
                    if path.path.matches_signal().is_some() {
                        return ParamShape::Signal { by_ref: false };
                    }

                    if let Some(vec) = path.path.matches_vec() {
                        let is_string = vec
                            .args
                            .first()
                            .and_then(|arg| plain_path(arg))
                            .map(|arg| arg.path.matches_string().is_some())
                            .unwrap_or(false);

                        if is_string {
                            return ParamShape::Strings;
                        }
                    }
                }
            }
        }

        ParamShape::Other(self.display_name())
    }

    fn is_self_type(&self, this: &Ident) -> bool {
        let Some(path) = plain_path(unwrap_groups(self)) else {
            return false;
        };

        path.path.is_ident("Self") || path.path.is_ident(this)
    }

    fn is_unit(&self) -> bool {
        match unwrap_groups(self) {
            Type::Tuple(tuple) => tuple.elems.is_empty(),
            _ => false,
        }
    }

    // Prints the type the way it is usually written in the source code:
    // `Vec<u8>` rather than `Vec < u8 >`.
    fn display_name(&self) -> String {
        let mut result = String::new();

        print_stream(&mut result, self.to_token_stream());

        result
    }
}

fn unwrap_groups(mut ty: &Type) -> &Type {
    loop {
        match ty {
            Type::Group(group) => ty = group.elem.as_ref(),
            Type::Paren(paren) => ty = paren.elem.as_ref(),
            other => return other,
        }
    }
}

fn plain_path(ty: &Type) -> Option<&TypePath> {
    match unwrap_groups(ty) {
        Type::Path(path) if path.qself.is_none() => Some(path),
        _ => None,
    }
}

fn print_stream(target: &mut String, stream: TokenStream) {
    let mut word = false;

    for tree in stream {
        match tree {
            TokenTree::Group(group) => {
                let (open, close) = match group.delimiter() {
                    proc_macro2::Delimiter::Parenthesis => ("(", ")"),
                    proc_macro2::Delimiter::Bracket => ("[", "]"),
                    proc_macro2::Delimiter::Brace => ("{", "}"),
                    proc_macro2::Delimiter::None => ("", ""),
                };

                target.push_str(open);
                print_stream(target, group.stream());
                target.push_str(close);

                word = false;
            }

            TokenTree::Ident(ident) => {
                if word {
                    target.push(' ');
                }

                target.push_str(&ident.to_string());

                word = true;
            }

            TokenTree::Literal(literal) => {
                if word {
                    target.push(' ');
                }

                target.push_str(&literal.to_string());

                word = true;
            }

            TokenTree::Punct(punct) => {
                let ch = punct.as_char();

                target.push(ch);

                if ch == ',' || ch == ';' {
                    target.push(' ');
                }

                word = false;
            }
        }
    }
}
