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

use quote::{quote_spanned, ToTokens};
use syn::{Error, ItemFn, Result};

use crate::{
    script::{
        item_impl::{is_generic, params, receiver},
        ScriptConfig,
    },
    utils::{
        Annotations,
        Context,
        EntryPointDeclaration,
        Group,
        Operation,
        Receiver,
        Scriptable,
        DESCRIPTION,
        DUMP,
        ENTRY_POINT,
        NAME,
    },
};

pub fn script_item_fn(item: &mut ItemFn) -> Result<ScriptConfig> {
    let attrs = item.drain_attrs()?;

    attrs.check(DUMP | ENTRY_POINT | NAME | DESCRIPTION)?;

    let _ = attrs.require_role(ENTRY_POINT)?;

    let sig = &item.sig;
    let ident = &sig.ident;
    let span = ident.span();

    if receiver(sig)? != Receiver::Static {
        return Err(Error::new(span, "Entry point function cannot take self."));
    }

    if let Some(asyncness) = &sig.asyncness {
        return Err(Error::new(
            asyncness.span,
            "Entry point function cannot be async.",
        ));
    }

    let mut annotations = Annotations::new(span);

    annotations.entry_point();

    if let Some(name) = attrs.name() {
        annotations.name(name);
    }

    if let Some(description) = attrs.description().cloned().or_else(|| item.rust_doc()) {
        annotations.description(&description);
    }

    let operation = Operation {
        span,
        origin: Context.primary_origin(),
        name: ident,
        annotations,
        generic: is_generic(sig),
        receiver: Receiver::Static,
        params: params(sig),
        this: None,
        callee: quote_spanned!(span=> #ident),
    };

    if attrs.disabled() {
        return Ok(ScriptConfig {
            dump: attrs.dump(),
            stream: None,
        });
    }

    let mut group = Group::default();

    group.entry_point(EntryPointDeclaration {
        operation: operation.into_token_stream(),
    });

    Ok(ScriptConfig {
        dump: attrs.dump(),
        stream: Some(group.to_token_stream()),
    })
}
