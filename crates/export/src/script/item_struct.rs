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

use proc_macro2::TokenStream;
use quote::{quote_spanned, ToTokens};
use syn::{spanned::Spanned, Error, Index, ItemStruct, LitStr, Member, Result};

use crate::{
    script::ScriptConfig,
    utils::{
        seed_hash_set,
        Annotations,
        Attrs,
        Context,
        Facade,
        Field,
        FieldKind,
        Group,
        ModuleDeclaration,
        Role,
        Scriptable,
        TypeDeclaration,
        DESCRIPTION,
        DUMP,
        GROUP,
        MODULE,
        NAME,
        RANGE,
        SETTING,
        SINK,
        VERSION,
    },
};

pub fn script_item_struct(item: &mut ItemStruct) -> Result<ScriptConfig> {
    let attrs = item.drain_attrs()?;

    match attrs.role() {
        Some(Role::Module) => script_module(item, attrs),
        _ => script_type(item, attrs),
    }
}

fn script_module(item: &mut ItemStruct, attrs: Attrs) -> Result<ScriptConfig> {
    attrs.check(DUMP | MODULE | NAME | DESCRIPTION | VERSION)?;

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Script module struct cannot have generic parameters.",
        ));
    }

    for field in &item.fields {
        field.deny_script()?;
    }

    let span = item.ident.span();

    let core = span.face_core();
    let intrinsics = span.face_intrinsics();

    let ident = &item.ident;

    let meta_impl = quote_spanned!(span=>
        impl #core::runtime::ScriptModule for #ident {
            #[inline(always)]
            fn meta() -> &'static #core::runtime::ModuleMeta {
                #intrinsics::module_of::<Self>()
            }
        }
    );

    if attrs.disabled() {
        return Ok(ScriptConfig {
            dump: attrs.dump(),
            stream: Some(meta_impl),
        });
    }

    let mut group = Group::default();

    group.module(ModuleDeclaration {
        ty: ident,
        name: attrs.name(),
        version: attrs.version(),
        description: attrs.description().cloned().or_else(|| item.rust_doc()),
    });

    let group = group.to_token_stream();

    Ok(ScriptConfig {
        dump: attrs.dump(),
        stream: Some(quote_spanned!(span=> #meta_impl #group)),
    })
}

fn script_type(item: &mut ItemStruct, attrs: Attrs) -> Result<ScriptConfig> {
    attrs.check(DUMP | NAME | DESCRIPTION)?;

    let span = item.ident.span();

    let runtime = span.face_runtime();

    let generic = !item.generics.params.is_empty();

    let mut annotations = Annotations::new(span);

    annotations.script();

    if let Some(name) = attrs.name() {
        annotations.name(name);
    }

    if let Some(description) = attrs.description().cloned().or_else(|| item.rust_doc()) {
        annotations.description(&description);
    }

    let mut constructors = Vec::new();

    if !generic && attrs.derive().impls_default().is_some() {
        let ident = &item.ident;

        constructors.push(quote_spanned!(span=>
            #runtime::ConstructorMeta::default_of::<#ident>()
        ));
    }

    let members = script_fields(item, generic)?;

    if attrs.disabled() {
        return Ok(ScriptConfig {
            dump: attrs.dump(),
            stream: None,
        });
    }

    let mut group = Group::default();

    group.ty(TypeDeclaration {
        ty: &item.ident,
        origin: Context.primary_origin(),
        generic,
        annotations,
        constructors,
        members,
    });

    Ok(ScriptConfig {
        dump: attrs.dump(),
        stream: Some(group.to_token_stream()),
    })
}

fn script_fields(item: &mut ItemStruct, generic: bool) -> Result<Vec<TokenStream>> {
    let this = item.ident.to_token_stream();

    let mut members = Vec::new();
    let mut settings = seed_hash_set::<String>();

    for (index, field) in item.fields.iter_mut().enumerate() {
        let attrs = field.drain_attrs()?;

        if !attrs.specified() {
            continue;
        }

        attrs.check(SETTING | SINK | NAME | DESCRIPTION | GROUP | RANGE)?;

        let role = attrs.require_role(SETTING | SINK)?;

        if generic {
            continue;
        }

        let span = field.span();

        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index {
                index: index as u32,
                span,
            }),
        };

        let rust_name = match &field.ident {
            Some(ident) => ident.to_string(),
            None => index.to_string(),
        };

        let mut annotations = Annotations::new(span);

        let field = match role {
            Role::Sink => {
                attrs.check(SINK)?;

                annotations.sink();

                Field {
                    span,
                    origin: Context.make_origin(&rust_name, span),
                    name: rust_name,
                    annotations,
                    this: this.clone(),
                    kind: FieldKind::Sink { member: &member },
                }
            }

            _ => {
                let display_name = attrs
                    .name()
                    .map(LitStr::value)
                    .unwrap_or_else(|| rust_name.clone());

                if !settings.insert(display_name.clone()) {
                    return Err(Error::new(
                        span,
                        format!("Duplicate setting \"{display_name}\"."),
                    ));
                }

                annotations.setting(attrs.group());

                if let Some(name) = attrs.name() {
                    annotations.name(name);
                }

                if let Some(description) = attrs.description().cloned().or_else(|| field.rust_doc())
                {
                    annotations.description(&description);
                }

                if attrs.has_range() {
                    annotations.range(attrs.min(), attrs.max(), attrs.step());
                }

                Field {
                    span,
                    origin: Context.make_origin(&rust_name, span),
                    name: rust_name,
                    annotations,
                    this: this.clone(),
                    kind: FieldKind::Value {
                        member: &member,
                        ty: &field.ty,
                    },
                }
            }
        };

        members.push(field.into_token_stream());
    }

    Ok(members)
}
