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

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Error,
    Expr,
    Ident,
    Lit,
    LitStr,
    Meta,
    Result,
    Token,
};

use crate::utils::DeriveMeta;

pub const DUMP: u16 = 1 << 0;
pub const MODULE: u16 = 1 << 1;
pub const NAME: u16 = 1 << 2;
pub const DESCRIPTION: u16 = 1 << 3;
pub const VERSION: u16 = 1 << 4;
pub const GROUP: u16 = 1 << 5;
pub const SETTING: u16 = 1 << 6;
pub const RANGE: u16 = 1 << 7;
pub const SETTER: u16 = 1 << 8;
pub const SINK: u16 = 1 << 9;
pub const SETUP: u16 = 1 << 10;
pub const ENTRY_POINT: u16 = 1 << 11;
pub const CLEANUP: u16 = 1 << 12;
pub const MINI_SCRIPT: u16 = 1 << 13;
pub const ONCE: u16 = 1 << 14;

/// The role an item plays in a script module.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Module,
    Setting,
    Sink,
    Setup,
    EntryPoint,
    Cleanup,
    MiniScript,
}

impl Role {
    #[inline(always)]
    fn mask(self) -> u16 {
        match self {
            Self::Module => MODULE,
            Self::Setting => SETTING,
            Self::Sink => SINK,
            Self::Setup => SETUP,
            Self::EntryPoint => ENTRY_POINT,
            Self::Cleanup => CLEANUP,
            Self::MiniScript => MINI_SCRIPT,
        }
    }

    #[inline(always)]
    fn syntax(self) -> &'static str {
        match self {
            Self::Module => "#[script(module)]",
            Self::Setting => "#[script(setting)]",
            Self::Sink => "#[script(sink)]",
            Self::Setup => "#[script(setup)]",
            Self::EntryPoint => "#[script(entry_point)]",
            Self::Cleanup => "#[script(cleanup)]",
            Self::MiniScript => "#[script(mini_script)]",
        }
    }
}

const ROLES: [Role; 7] = [
    Role::Module,
    Role::Setting,
    Role::Sink,
    Role::Setup,
    Role::EntryPoint,
    Role::Cleanup,
    Role::MiniScript,
];

pub struct Attrs {
    span: Span,
    specified: bool,
    dump: Option<Span>,
    role: Option<(Span, Role)>,
    name: Option<LitStr>,
    description: Option<LitStr>,
    version: Option<LitStr>,
    group: Option<LitStr>,
    min: Option<(Span, Expr)>,
    max: Option<(Span, Expr)>,
    step: Option<(Span, Expr)>,
    setter: Option<(Span, Ident)>,
    once: Option<Span>,
    derive: DeriveMeta,
}

impl Attrs {
    /// Checks that every option of the item is allowed by the `mask` and
    /// that the options are consistent with the item's role.
    pub fn check(&self, mask: u16) -> Result<()> {
        if mask & DUMP == 0 {
            if let Some(span) = &self.dump {
                return Err(Error::new(*span, "Dump marker is not applicable here."));
            }
        }

        if let Some((span, role)) = &self.role {
            if mask & role.mask() == 0 {
                return Err(Error::new(
                    *span,
                    format!("{} marker is not applicable here.", role.syntax()),
                ));
            }
        }

        if mask & NAME == 0 {
            if let Some(name) = &self.name {
                return Err(Error::new(name.span(), "Renaming is not applicable here."));
            }
        }

        if mask & DESCRIPTION == 0 {
            if let Some(description) = &self.description {
                return Err(Error::new(
                    description.span(),
                    "Description is not applicable here.",
                ));
            }
        }

        if mask & VERSION == 0 {
            if let Some(version) = &self.version {
                return Err(Error::new(
                    version.span(),
                    "Version is not applicable here.",
                ));
            }
        }

        if mask & GROUP == 0 {
            if let Some(group) = &self.group {
                return Err(Error::new(group.span(), "Grouping is not applicable here."));
            }
        }

        if mask & RANGE == 0 {
            if let Some(span) = self.range_span() {
                return Err(Error::new(span, "Range bounds are not applicable here."));
            }
        }

        if mask & SETTER == 0 {
            if let Some((span, _)) = &self.setter {
                return Err(Error::new(*span, "Setter is not applicable here."));
            }
        }

        if mask & ONCE == 0 {
            if let Some(span) = &self.once {
                return Err(Error::new(*span, "Once marker is not applicable here."));
            }
        }

        let role = self.role.map(|(_, role)| role);

        if let Some(span) = &self.once {
            if !matches!(role, Some(Role::Setup | Role::Cleanup)) {
                return Err(Error::new(
                    *span,
                    "Once marker requires #[script(setup)] or #[script(cleanup)] marker.",
                ));
            }
        }

        if let Some(group) = &self.group {
            if !matches!(role, Some(Role::Setting | Role::MiniScript)) {
                return Err(Error::new(
                    group.span(),
                    "Grouping requires #[script(setting)] or #[script(mini_script)] marker.",
                ));
            }
        }

        if role != Some(Role::Setting) {
            if let Some(span) = self.range_span() {
                return Err(Error::new(
                    span,
                    "Range bounds require #[script(setting)] marker.",
                ));
            }

            if let Some((span, _)) = &self.setter {
                return Err(Error::new(
                    *span,
                    "Setter requires #[script(setting)] marker.",
                ));
            }
        }

        Ok(())
    }

    /// Returns the role of the item, or an error listing the roles allowed
    /// by the `mask`.
    pub fn require_role(&self, mask: u16) -> Result<Role> {
        if let Some((_, role)) = &self.role {
            if mask & role.mask() > 0 {
                return Ok(*role);
            }
        }

        let variants = ROLES
            .iter()
            .filter(|role| mask & role.mask() > 0)
            .map(|role| role.syntax())
            .collect::<Vec<_>>();

        if variants.len() == 1 {
            return Err(Error::new(
                self.span,
                format!("Missing {} marker.", variants[0]),
            ));
        }

        let mut message = String::from("Missing:\n");

        let mut first = true;

        for variant in variants {
            match first {
                true => {
                    first = false;
                    message.push_str("  - ");
                }
                false => {
                    message.push_str(";\n  - or ");
                }
            }

            message.push_str(variant);
            message.push_str(" marker");
        }

        message.push('.');

        Err(Error::new(self.span, message))
    }

    #[inline(always)]
    pub fn specified(&self) -> bool {
        self.specified
    }

    #[inline(always)]
    pub fn dump(&self) -> Option<Span> {
        self.dump
    }

    #[inline(always)]
    pub fn role(&self) -> Option<Role> {
        self.role.map(|(_, role)| role)
    }

    #[inline(always)]
    pub fn name(&self) -> Option<&LitStr> {
        self.name.as_ref()
    }

    #[inline(always)]
    pub fn description(&self) -> Option<&LitStr> {
        self.description.as_ref()
    }

    #[inline(always)]
    pub fn version(&self) -> Option<&LitStr> {
        self.version.as_ref()
    }

    #[inline(always)]
    pub fn group(&self) -> Option<&LitStr> {
        self.group.as_ref()
    }

    #[inline(always)]
    pub fn min(&self) -> Option<&Expr> {
        self.min.as_ref().map(|(_, expr)| expr)
    }

    #[inline(always)]
    pub fn max(&self) -> Option<&Expr> {
        self.max.as_ref().map(|(_, expr)| expr)
    }

    #[inline(always)]
    pub fn step(&self) -> Option<&Expr> {
        self.step.as_ref().map(|(_, expr)| expr)
    }

    #[inline(always)]
    pub fn has_range(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.step.is_some()
    }

    #[inline(always)]
    pub fn setter(&self) -> Option<&Ident> {
        self.setter.as_ref().map(|(_, ident)| ident)
    }

    #[inline(always)]
    pub fn once(&self) -> bool {
        self.once.is_some()
    }

    #[inline(always)]
    pub fn derive(&self) -> &DeriveMeta {
        &self.derive
    }

    /// Returns true if the crate is built without the declaration export
    /// machinery: the items are emitted as is, and the module stays empty.
    #[inline]
    pub fn disabled(&self) -> bool {
        #[cfg(feature = "export")]
        {
            return false;
        }

        #[cfg(not(feature = "export"))]
        {
            return true;
        }
    }

    #[inline]
    fn range_span(&self) -> Option<Span> {
        [&self.min, &self.max, &self.step]
            .into_iter()
            .flatten()
            .map(|(span, _)| *span)
            .next()
    }

    fn append(&mut self, attr: Attr) -> Result<()> {
        match attr {
            Attr::Dump(span) => {
                if self.dump.is_some() {
                    return Err(Error::new(span, "Duplicate dump marker."));
                }

                self.dump = Some(span);
            }

            Attr::Role(span, role) => {
                if let Some((_, previous)) = &self.role {
                    return Err(match *previous == role {
                        true => Error::new(span, format!("Duplicate {} marker.", role.syntax())),
                        false => Error::new(
                            span,
                            format!(
                                "{} marker conflicts with {} marker.",
                                role.syntax(),
                                previous.syntax(),
                            ),
                        ),
                    });
                }

                self.role = Some((span, role));
            }

            Attr::Name(name) => {
                if self.name.is_some() {
                    return Err(Error::new(name.span(), "Duplicate rename."));
                }

                if name.value().trim().is_empty() {
                    return Err(Error::new(name.span(), "Empty name."));
                }

                self.name = Some(name);
            }

            Attr::Description(description) => {
                if self.description.is_some() {
                    return Err(Error::new(description.span(), "Duplicate description."));
                }

                self.description = Some(description);
            }

            Attr::Version(version) => {
                if self.version.is_some() {
                    return Err(Error::new(version.span(), "Duplicate version."));
                }

                self.version = Some(version);
            }

            Attr::Group(group) => {
                if self.group.is_some() {
                    return Err(Error::new(group.span(), "Duplicate group."));
                }

                self.group = Some(group);
            }

            Attr::Min(span, expr) => {
                if self.min.is_some() {
                    return Err(Error::new(span, "Duplicate lower bound."));
                }

                self.min = Some((span, expr));
            }

            Attr::Max(span, expr) => {
                if self.max.is_some() {
                    return Err(Error::new(span, "Duplicate upper bound."));
                }

                self.max = Some((span, expr));
            }

            Attr::Step(span, expr) => {
                if self.step.is_some() {
                    return Err(Error::new(span, "Duplicate step."));
                }

                self.step = Some((span, expr));
            }

            Attr::Setter(span, ident) => {
                if self.setter.is_some() {
                    return Err(Error::new(span, "Duplicate setter."));
                }

                self.setter = Some((span, ident));
            }

            Attr::Once(span) => {
                if self.once.is_some() {
                    return Err(Error::new(span, "Duplicate once marker."));
                }

                self.once = Some(span);
            }
        }

        Ok(())
    }
}

pub trait Scriptable: inner::WithAttributes {
    /// Removes the `#[script]` attributes from the item and returns their
    /// merged options.
    fn drain_attrs(&mut self) -> Result<Attrs> {
        let span = self.span();
        let attributes = self.attributes_mut();

        let mut script_attributes = Vec::with_capacity(attributes.len().min(1));

        let mut derive = DeriveMeta::default();

        for attribute in attributes.iter() {
            derive.enrich(attribute)?;
        }

        attributes.retain(|attribute| {
            if attribute.path().is_ident("script") {
                script_attributes.push(attribute.clone());
                return false;
            }

            true
        });

        let mut result = Attrs {
            span,
            specified: !script_attributes.is_empty(),
            dump: None,
            role: None,
            name: None,
            description: None,
            version: None,
            group: None,
            min: None,
            max: None,
            step: None,
            setter: None,
            once: None,
            derive,
        };

        for attribute in script_attributes {
            let attrs = match &attribute.meta {
                Meta::List(meta) => {
                    meta.parse_args_with(Punctuated::<Attr, Token![,]>::parse_terminated)?
                }

                Meta::NameValue(meta) => {
                    return Err(Error::new(
                        meta.eq_token.span,
                        "Name-value attribute format is not supported.",
                    ))
                }

                Meta::Path(..) => continue,
            };

            for attr in attrs {
                result.append(attr)?;
            }
        }

        Ok(result)
    }

    /// Collects the Rust documentation of the item into a single string
    /// literal. Returns None if the item has no documentation.
    fn rust_doc(&self) -> Option<LitStr> {
        let mut result: Option<(String, Span)> = None;

        for attribute in self.attributes() {
            let Meta::NameValue(meta) = &attribute.meta else {
                continue;
            };

            if !meta.path.is_ident("doc") {
                continue;
            }

            let Expr::Lit(value) = &meta.value else {
                continue;
            };

            let Lit::Str(value) = &value.lit else {
                continue;
            };

            let line = value.value();
            let line = line.trim();

            match &mut result {
                None => result = Some((String::from(line), value.span())),

                Some((result, _)) => {
                    result.push('\n');
                    result.push_str(line);
                }
            }
        }

        let (text, span) = result?;

        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        Some(LitStr::new(text, span))
    }

    fn deny_script(&self) -> Result<()> {
        for attribute in self.attributes() {
            if attribute.path().is_ident("script") {
                return Err(Error::new_spanned(
                    attribute,
                    "Script attribute is not applicable here.",
                ));
            }
        }

        Ok(())
    }
}

impl<T: inner::WithAttributes> Scriptable for T {}

enum Attr {
    Dump(Span),
    Role(Span, Role),
    Name(LitStr),
    Description(LitStr),
    Version(LitStr),
    Group(LitStr),
    Min(Span, Expr),
    Max(Span, Expr),
    Step(Span, Expr),
    Setter(Span, Ident),
    Once(Span),
}

impl Parse for Attr {
    fn parse(input: ParseStream) -> Result<Self> {
        let lookahead = input.lookahead1();

        if lookahead.peek(keyword::dump) {
            let keyword = input.parse::<keyword::dump>()?;

            return Ok(Self::Dump(keyword.span));
        }

        if lookahead.peek(keyword::module) {
            let keyword = input.parse::<keyword::module>()?;

            return Ok(Self::Role(keyword.span, Role::Module));
        }

        if lookahead.peek(keyword::setting) {
            let keyword = input.parse::<keyword::setting>()?;

            return Ok(Self::Role(keyword.span, Role::Setting));
        }

        if lookahead.peek(keyword::sink) {
            let keyword = input.parse::<keyword::sink>()?;

            return Ok(Self::Role(keyword.span, Role::Sink));
        }

        if lookahead.peek(keyword::setup) {
            let keyword = input.parse::<keyword::setup>()?;

            return Ok(Self::Role(keyword.span, Role::Setup));
        }

        if lookahead.peek(keyword::entry_point) {
            let keyword = input.parse::<keyword::entry_point>()?;

            return Ok(Self::Role(keyword.span, Role::EntryPoint));
        }

        if lookahead.peek(keyword::cleanup) {
            let keyword = input.parse::<keyword::cleanup>()?;

            return Ok(Self::Role(keyword.span, Role::Cleanup));
        }

        if lookahead.peek(keyword::mini_script) {
            let keyword = input.parse::<keyword::mini_script>()?;

            return Ok(Self::Role(keyword.span, Role::MiniScript));
        }

        if lookahead.peek(keyword::once) {
            let keyword = input.parse::<keyword::once>()?;

            return Ok(Self::Once(keyword.span));
        }

        if lookahead.peek(keyword::name) {
            let _ = input.parse::<keyword::name>()?;

            return Ok(Self::Name(input.parse::<LitStr>()?));
        }

        if lookahead.peek(keyword::description) {
            let _ = input.parse::<keyword::description>()?;

            return Ok(Self::Description(input.parse::<LitStr>()?));
        }

        if lookahead.peek(keyword::version) {
            let _ = input.parse::<keyword::version>()?;

            return Ok(Self::Version(input.parse::<LitStr>()?));
        }

        if lookahead.peek(keyword::group) {
            let _ = input.parse::<keyword::group>()?;

            return Ok(Self::Group(input.parse::<LitStr>()?));
        }

        if lookahead.peek(keyword::min) {
            let keyword = input.parse::<keyword::min>()?;

            return Ok(Self::Min(keyword.span, input.parse::<Expr>()?));
        }

        if lookahead.peek(keyword::max) {
            let keyword = input.parse::<keyword::max>()?;

            return Ok(Self::Max(keyword.span, input.parse::<Expr>()?));
        }

        if lookahead.peek(keyword::step) {
            let keyword = input.parse::<keyword::step>()?;

            return Ok(Self::Step(keyword.span, input.parse::<Expr>()?));
        }

        if lookahead.peek(keyword::setter) {
            let keyword = input.parse::<keyword::setter>()?;

            return Ok(Self::Setter(keyword.span, input.parse::<Ident>()?));
        }

        Err(lookahead.error())
    }
}

mod keyword {
    syn::custom_keyword!(dump);
    syn::custom_keyword!(module);
    syn::custom_keyword!(name);
    syn::custom_keyword!(description);
    syn::custom_keyword!(version);
    syn::custom_keyword!(group);
    syn::custom_keyword!(setting);
    syn::custom_keyword!(min);
    syn::custom_keyword!(max);
    syn::custom_keyword!(step);
    syn::custom_keyword!(setter);
    syn::custom_keyword!(sink);
    syn::custom_keyword!(setup);
    syn::custom_keyword!(entry_point);
    syn::custom_keyword!(cleanup);
    syn::custom_keyword!(mini_script);
    syn::custom_keyword!(once);
}

mod inner {
    use syn::{spanned::Spanned, Attribute, Field, ImplItemFn, ItemFn, ItemImpl, ItemStruct};

    pub trait WithAttributes: Spanned {
        fn attributes(&self) -> &Vec<Attribute>;

        fn attributes_mut(&mut self) -> &mut Vec<Attribute>;
    }

    impl WithAttributes for ItemStruct {
        #[inline(always)]
        fn attributes(&self) -> &Vec<Attribute> {
            &self.attrs
        }

        #[inline(always)]
        fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
            &mut self.attrs
        }
    }

    impl WithAttributes for ItemImpl {
        #[inline(always)]
        fn attributes(&self) -> &Vec<Attribute> {
            &self.attrs
        }

        #[inline(always)]
        fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
            &mut self.attrs
        }
    }

    impl WithAttributes for ItemFn {
        #[inline(always)]
        fn attributes(&self) -> &Vec<Attribute> {
            &self.attrs
        }

        #[inline(always)]
        fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
            &mut self.attrs
        }
    }

    impl WithAttributes for ImplItemFn {
        #[inline(always)]
        fn attributes(&self) -> &Vec<Attribute> {
            &self.attrs
        }

        #[inline(always)]
        fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
            &mut self.attrs
        }
    }

    impl WithAttributes for Field {
        #[inline(always)]
        fn attributes(&self) -> &Vec<Attribute> {
            &self.attrs
        }

        #[inline(always)]
        fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
            &mut self.attrs
        }
    }
}
