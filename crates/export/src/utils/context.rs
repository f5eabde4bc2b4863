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
    cell::RefCell,
    env::var,
    hash::{Hash, Hasher},
};

use ahash::AHasher;
use convert_case::{Case, Casing};
use proc_macro2::{Delimiter, Ident, Spacing, Span, TokenStream, TokenTree};
use quote::{quote_spanned, ToTokens};
use syn::{spanned::Spanned, Item, Type};

use crate::utils::{seed_hasher, Facade};

pub type OriginRef = Ident;
pub type SectionName = Ident;

/// The state of a single macro invocation.
///
/// The context derives unique identifiers of the generated items from the
/// hash of the annotated item's tokens and collects the [RustOrigin] statics
/// that the generated declarations refer to.
#[derive(Clone, Copy)]
pub struct Context;

impl ToTokens for Context {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.borrow(|inner| inner.to_tokens(tokens));
    }
}

impl Context {
    #[inline(always)]
    pub fn init(self, item: &Item) {
        INNER.with_borrow_mut(|inner| {
            if inner.is_some() {
                panic!("Internal error. Inner context already initialized.")
            }

            *inner = Some(ContextInner::new(item));
        })
    }

    #[inline(always)]
    pub fn release(self) {
        INNER.with_borrow_mut(|inner| {
            if inner.is_none() {
                panic!("Internal error. Inner context already released.")
            }

            *inner = None;
        })
    }

    #[inline(always)]
    pub fn name(self) -> String {
        self.borrow(move |inner| inner.name.clone())
    }

    #[inline(always)]
    pub fn span(self) -> Span {
        self.borrow(move |inner| inner.span)
    }

    #[inline(always)]
    pub fn primary_origin(self) -> OriginRef {
        self.borrow(move |inner| inner.origins[0].clone())
    }

    /// Creates a [RustOrigin] static that points to the `span`.
    #[inline(always)]
    pub fn make_origin(self, name: &str, span: Span) -> OriginRef {
        self.borrow(move |inner| {
            let reference = unique_ident(&mut inner.hasher, Tag::Origin, "origin", name, span);

            inner.origins.push(reference.clone());

            reference
        })
    }

    #[inline(always)]
    pub fn make_section_name(self, name: &str, span: Span) -> SectionName {
        self.borrow(move |inner| {
            unique_ident(
                &mut inner.hasher,
                Tag::Section,
                "__stagehand_export",
                name,
                span,
            )
        })
    }

    #[inline(always)]
    fn borrow<R>(&self, f: impl FnOnce(&mut ContextInner) -> R) -> R {
        INNER.with_borrow_mut(|inner| {
            let Some(inner) = inner else {
                panic!("Internal error. Inner context is not initialized.");
            };

            f(inner)
        })
    }
}

thread_local! {
    static INNER: RefCell<Option<ContextInner>> = RefCell::new(None)
}

struct ContextInner {
    name: String,
    span: Span,
    hasher: AHasher,
    origins: Vec<Ident>,
}

impl ToTokens for ContextInner {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        for ident in &self.origins {
            let span = ident.span();

            let core = span.face_core();
            let module_path = span.face_module_path();
            let line = span.face_line();
            let column = span.face_column();
            let panic = span.face_panic();
            let env = span.face_env();
            let option = span.face_option();

            quote_spanned!(span=> static #ident: #core::runtime::RustOrigin = {
                #[cold]
                #[track_caller]
                fn blame_fn(message: &str) {
                    #panic("{}", message);
                }

                #core::runtime::RustOrigin {
                    package: #option::<(&'static str, &'static str)>::Some(
                        (#env("CARGO_PKG_NAME"), #env("CARGO_PKG_VERSION")),
                    ),
                    code: #option::<#core::runtime::RustCode>::Some(
                        #core::runtime::RustCode {
                            module: #module_path(),
                            line: #line(),
                            column: #column(),
                            blame_fn,
                        },
                    ),
                }
            };)
            .to_tokens(tokens)
        }
    }
}

impl ContextInner {
    fn new(item: &Item) -> Self {
        let mut hasher = seed_hasher();

        for key in ["CARGO_PKG_NAME", "CARGO_PKG_VERSION"] {
            Tag::Env.feed(&mut hasher);
            var(key).unwrap_or_default().hash(&mut hasher);
        }

        Tag::Item.feed(&mut hasher);
        feed_stream(&mut hasher, item.to_token_stream());

        let (span, name) = match item {
            Item::Fn(item) => (item.sig.ident.span(), format!("fn {}", item.sig.ident)),

            Item::Impl(item) => {
                let this = match item.self_ty.as_ref() {
                    Type::Path(ty) => ty.path.get_ident().map(|ident| ident.to_string()),
                    _ => None,
                }
                .unwrap_or_else(|| String::from("type"));

                let name = match item.trait_.as_ref().and_then(|(_, path, _)| path.segments.last()) {
                    Some(segment) => format!("{} for {this}", segment.ident),
                    None => this,
                };

                (item.self_ty.span(), name)
            }

            Item::Struct(item) => (item.ident.span(), format!("struct {}", item.ident)),

            _ => (Span::call_site(), String::new()),
        };

        let primary_origin = unique_ident(&mut hasher, Tag::Origin, "origin", &name, span);

        Self {
            name,
            span,
            hasher,
            origins: vec![primary_origin],
        }
    }
}

// Hash domain separators. Each one precedes the data it tags, so that
// different token sequences never feed the same bytes.
#[derive(Clone, Copy)]
#[repr(u8)]
enum Tag {
    Env,
    Item,
    Origin,
    Section,
    Parenthesis,
    Brace,
    Bracket,
    Group,
    Ident,
    Alone,
    Joint,
    Literal,
}

impl Tag {
    #[inline(always)]
    fn feed(self, hasher: &mut impl Hasher) {
        hasher.write_u8(self as u8);
    }
}

// Produces an UPPER_SNAKE identifier of the form
// `<PREFIX>_<hash>_<NAME>`, where the hash depends on everything the context
// has fed so far and on the `name`.
fn unique_ident(
    hasher: &mut impl Hasher,
    tag: Tag,
    prefix: &str,
    name: &str,
    span: Span,
) -> Ident {
    tag.feed(hasher);
    name.hash(hasher);

    let mut string = format!("{prefix}_{:016x}", hasher.finish()).to_ascii_uppercase();

    let suffix = name
        .to_case(Case::UpperSnake)
        .chars()
        .filter(|char| char.is_ascii_alphanumeric() || *char == '_')
        .collect::<String>();

    if !suffix.is_empty() {
        string.push('_');
        string.push_str(&suffix);
    }

    Ident::new(&string, span)
}

fn feed_stream(hasher: &mut impl Hasher, stream: TokenStream) {
    for tree in stream {
        match tree {
            TokenTree::Group(group) => {
                match group.delimiter() {
                    Delimiter::Parenthesis => Tag::Parenthesis,
                    Delimiter::Brace => Tag::Brace,
                    Delimiter::Bracket => Tag::Bracket,
                    Delimiter::None => Tag::Group,
                }
                .feed(hasher);

                feed_stream(hasher, group.stream());
            }

            TokenTree::Ident(ident) => {
                Tag::Ident.feed(hasher);
                ident.to_string().hash(hasher);
            }

            TokenTree::Punct(punct) => {
                match punct.spacing() {
                    Spacing::Alone => Tag::Alone,
                    Spacing::Joint => Tag::Joint,
                }
                .feed(hasher);

                punct.as_char().hash(hasher);
            }

            TokenTree::Literal(literal) => {
                Tag::Literal.feed(hasher);
                literal.to_string().hash(hasher);
            }
        }
    }
}
