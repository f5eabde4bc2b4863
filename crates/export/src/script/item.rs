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
use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned,
    Error,
    Item,
    Result,
};

use crate::{
    script::{
        item_fn::script_item_fn,
        item_impl::script_item_impl,
        item_struct::script_item_struct,
    },
    utils::Context,
};

pub struct ScriptItem(TokenStream);

impl Parse for ScriptItem {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut item = input.parse::<Item>()?;

        Context.init(&item);

        let config = match &mut item {
            Item::Struct(item) => script_item_struct(item),

            Item::Impl(item) => script_item_impl(item),

            Item::Fn(item) => script_item_fn(item),

            Item::Enum(item) => Err(Error::new(
                item.enum_token.span,
                "Enum types cannot be scripts. Use a struct instead.",
            )),

            Item::Trait(item) => Err(Error::new(
                item.trait_token.span,
                "Traits cannot be scripts. Mark the trait's impl block instead.",
            )),

            Item::Mod(item) => Err(Error::new(
                item.mod_token.span,
                "Script modules are declared on a struct: #[script(module)] struct Module;",
            )),

            _ => Err(Error::new(
                item.span(),
                "Only structs, impl blocks, and functions can be marked with the script attribute.",
            )),
        };

        Context.release();

        Ok(Self(config?.export(&item)?))
    }
}

impl From<ScriptItem> for proc_macro::TokenStream {
    #[inline(always)]
    fn from(value: ScriptItem) -> Self {
        value.0.into()
    }
}
