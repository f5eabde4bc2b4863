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

use proc_macro2::{Ident, TokenStream};
use quote::{quote_spanned, ToTokens};
use syn::{
    spanned::Spanned,
    Error,
    FnArg,
    ImplItem,
    ImplItemFn,
    ItemImpl,
    LitStr,
    Pat,
    Result,
    ReturnType,
    Signature,
    Type,
    Visibility,
};

use crate::{
    script::ScriptConfig,
    utils::{
        seed_hash_set,
        Annotations,
        Attrs,
        Constructor,
        Context,
        Facade,
        Field,
        FieldKind,
        Group,
        ImplDeclaration,
        Operation,
        Param,
        PathUtils,
        Receiver,
        Role,
        Scriptable,
        TypeUtils,
        CLEANUP,
        DESCRIPTION,
        DUMP,
        ENTRY_POINT,
        GROUP,
        MINI_SCRIPT,
        NAME,
        ONCE,
        RANGE,
        SETTER,
        SETTING,
        SETUP,
    },
};

pub fn script_item_impl(item: &mut ItemImpl) -> Result<ScriptConfig> {
    let attrs = item.drain_attrs()?;

    attrs.check(DUMP)?;

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Generic impl blocks cannot be scripted.",
        ));
    }

    if let Some((Some(bang), _, _)) = &item.trait_ {
        return Err(Error::new(
            bang.span,
            "Negative impl blocks cannot be scripted.",
        ));
    }

    let self_ty = item.self_ty.as_ref().clone();

    let Some(this) = self_ident(&self_ty) else {
        return Err(Error::new(
            self_ty.span(),
            "Only struct types declared in this crate can be scripted.",
        ));
    };

    let span = self_ty.span();

    let runtime = span.face_runtime();

    let trait_path = item.trait_.as_ref().map(|(_, path, _)| path.clone());

    let callee = match &trait_path {
        Some(path) => quote_spanned!(span=> <#self_ty as #path>),
        None => quote_spanned!(span=> <#self_ty>),
    };

    let mut declaration = ImplDeclaration {
        ty: &self_ty,
        constructors: Vec::new(),
        operations: Vec::new(),
        members: Vec::new(),
        release: false,
    };

    let mut scripted = Vec::new();

    for impl_item in &mut item.items {
        let ImplItem::Fn(function) = impl_item else {
            continue;
        };

        let attrs = function.drain_attrs()?;

        if !attrs.specified() {
            continue;
        }

        scripted.push((function.sig.ident.clone(), attrs));
    }

    let functions = item
        .items
        .iter()
        .filter_map(|impl_item| match impl_item {
            ImplItem::Fn(function) => Some(function),
            _ => None,
        })
        .collect::<Vec<_>>();

    match &trait_path {
        Some(path) if path.matches_release().is_some() => declaration.release = true,

        Some(path) if path.matches_default().is_some() => {
            declaration.constructors.push(quote_spanned!(span=>
                #runtime::ConstructorMeta::default_of::<#self_ty>()
            ));
        }

        Some(_) => (),

        None => {
            for function in &functions {
                if scripted.iter().any(|(ident, _)| ident == &function.sig.ident) {
                    continue;
                }

                if let Some(constructor) = constructor(function, this, &callee) {
                    declaration.constructors.push(constructor);
                }
            }
        }
    }

    let mut settings = seed_hash_set::<String>();

    for (ident, attrs) in &scripted {
        let Some(function) = functions
            .iter()
            .find(|function| &function.sig.ident == ident)
        else {
            continue;
        };

        attrs.check(
            NAME | DESCRIPTION
                | GROUP
                | ONCE
                | RANGE
                | SETTER
                | SETTING
                | SETUP
                | ENTRY_POINT
                | CLEANUP
                | MINI_SCRIPT,
        )?;

        let role = attrs.require_role(SETTING | SETUP | ENTRY_POINT | CLEANUP | MINI_SCRIPT)?;

        match role {
            Role::Setting => {
                let display_name = attrs
                    .name()
                    .map(LitStr::value)
                    .unwrap_or_else(|| ident.to_string());

                if !settings.insert(display_name.clone()) {
                    return Err(Error::new(
                        ident.span(),
                        format!("Duplicate setting \"{display_name}\"."),
                    ));
                }

                declaration
                    .members
                    .push(property(function, attrs, &functions, &self_ty, &callee)?);
            }

            _ => {
                let mut annotations = Annotations::new(ident.span());

                match role {
                    Role::Setup => annotations.setup(attrs.once()),
                    Role::EntryPoint => annotations.entry_point(),
                    Role::Cleanup => annotations.cleanup(attrs.once()),
                    _ => annotations.mini_script(attrs.group()),
                };

                describe(&mut annotations, attrs, function);

                let sig = &function.sig;

                let operation = Operation {
                    span: ident.span(),
                    origin: Context.make_origin(&ident.to_string(), ident.span()),
                    name: ident,
                    annotations,
                    generic: is_generic(sig),
                    receiver: receiver(sig)?,
                    params: params(sig),
                    this: Some(&self_ty),
                    callee: quote_spanned!(span=> #callee::#ident),
                };

                declaration.operations.push(operation.into_token_stream());
            }
        }
    }

    if attrs.disabled() {
        return Ok(ScriptConfig {
            dump: attrs.dump(),
            stream: None,
        });
    }

    let empty = declaration.constructors.is_empty()
        && declaration.operations.is_empty()
        && declaration.members.is_empty()
        && !declaration.release;

    if empty {
        return Ok(ScriptConfig {
            dump: attrs.dump(),
            stream: None,
        });
    }

    let mut group = Group::default();

    group.implementation(declaration);

    Ok(ScriptConfig {
        dump: attrs.dump(),
        stream: Some(group.to_token_stream()),
    })
}

fn property(
    function: &ImplItemFn,
    attrs: &Attrs,
    functions: &[&ImplItemFn],
    self_ty: &Type,
    callee: &TokenStream,
) -> Result<TokenStream> {
    let sig = &function.sig;
    let getter = &sig.ident;
    let span = getter.span();

    if is_generic(sig) {
        return Err(Error::new(
            sig.generics.span(),
            "Setting getter cannot have generic parameters.",
        ));
    }

    let receiver = receiver(sig)?;

    if receiver == Receiver::Mut {
        return Err(Error::new(
            sig.inputs.span(),
            "Setting getter must take &self or no receiver.",
        ));
    }

    if !params(sig).is_empty() {
        return Err(Error::new(
            sig.inputs.span(),
            "Setting getter cannot have parameters.",
        ));
    }

    let ty = match &sig.output {
        ReturnType::Type(_, ty) if !ty.is_unit() => ty.as_ref(),

        _ => {
            return Err(Error::new(
                sig.output.span(),
                "Setting getter must return a value.",
            ))
        }
    };

    let setter = match attrs.setter() {
        None => None,

        Some(setter) => {
            let Some(function) = functions
                .iter()
                .find(|function| &function.sig.ident == setter)
            else {
                return Err(Error::new(
                    setter.span(),
                    format!("Setter \"{setter}\" is not declared in this impl block."),
                ));
            };

            let expected = match receiver {
                Receiver::Static => Receiver::Static,
                _ => Receiver::Mut,
            };

            let setter_receiver = self::receiver(&function.sig)?;

            let expected_inputs = match expected {
                Receiver::Static => 1,
                _ => 2,
            };

            if setter_receiver != expected || function.sig.inputs.len() != expected_inputs {
                let message = match expected {
                    Receiver::Static => {
                        "Setter of a static setting must be a static function with a single \
                        parameter."
                    }

                    _ => "Setter must take &mut self and a single parameter.",
                };

                return Err(Error::new(function.sig.span(), message));
            }

            Some(setter)
        }
    };

    let mut annotations = Annotations::new(span);

    annotations.setting(attrs.group());

    describe(&mut annotations, attrs, function);

    if attrs.has_range() {
        annotations.range(attrs.min(), attrs.max(), attrs.step());
    }

    let field = Field {
        span,
        origin: Context.make_origin(&getter.to_string(), span),
        name: getter.to_string(),
        annotations,
        this: self_ty.to_token_stream(),
        kind: FieldKind::Property {
            ty,
            getter,
            setter,
            receiver,
            callee: callee.clone(),
        },
    };

    Ok(field.into_token_stream())
}

// Public inherent functions without a receiver that return the Self type.
fn constructor(function: &ImplItemFn, this: &Ident, callee: &TokenStream) -> Option<TokenStream> {
    let sig = &function.sig;

    if sig.receiver().is_some() || is_generic(sig) {
        return None;
    }

    let returns_self = match &sig.output {
        ReturnType::Type(_, ty) => ty.is_self_type(this),
        ReturnType::Default => false,
    };

    if !returns_self {
        return None;
    }

    let span = sig.ident.span();
    let ident = &sig.ident;
    let params = params(sig);

    let construct = match params.is_empty() {
        true => Some(quote_spanned!(span=> #callee::#ident())),
        false => None,
    };

    Some(
        Constructor {
            span,
            name: ident,
            public: matches!(function.vis, Visibility::Public(..)),
            params,
            construct,
        }
        .into_token_stream(),
    )
}

fn describe(annotations: &mut Annotations, attrs: &Attrs, function: &ImplItemFn) {
    if let Some(name) = attrs.name() {
        annotations.name(name);
    }

    if let Some(description) = attrs.description().cloned().or_else(|| function.rust_doc()) {
        annotations.description(&description);
    }
}

pub(super) fn receiver(sig: &Signature) -> Result<Receiver> {
    let Some(receiver) = sig.receiver() else {
        return Ok(Receiver::Static);
    };

    if receiver.reference.is_none() || receiver.colon_token.is_some() {
        return Err(Error::new(
            receiver.span(),
            "Only &self and &mut self receivers are supported.",
        ));
    }

    match receiver.mutability.is_some() {
        true => Ok(Receiver::Mut),
        false => Ok(Receiver::Ref),
    }
}

pub(super) fn params(sig: &Signature) -> Vec<Param> {
    sig.inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Receiver(..) => None,

            FnArg::Typed(input) => {
                let name = match input.pat.as_ref() {
                    Pat::Ident(pat) => pat.ident.to_string(),
                    _ => String::from("_"),
                };

                Some(Param {
                    span: input.span(),
                    name,
                    shape: input.ty.param_shape(),
                })
            }
        })
        .collect()
}

pub(super) fn is_generic(sig: &Signature) -> bool {
    sig.generics.type_params().next().is_some() || sig.generics.const_params().next().is_some()
}

fn self_ident(ty: &Type) -> Option<&Ident> {
    let Type::Path(path) = ty else {
        return None;
    };

    if path.qself.is_some() {
        return None;
    }

    Some(&path.path.segments.last()?.ident)
}
