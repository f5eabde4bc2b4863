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
use quote::quote_spanned;
use syn::spanned::Spanned;

// Absolute paths of the items the generated code refers to.
pub trait Facade: Spanned {
    #[inline(always)]
    fn face_core(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::stagehand)
    }

    #[inline(always)]
    fn face_intrinsics(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::stagehand::runtime::__intrinsics)
    }

    #[inline(always)]
    fn face_runtime(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::stagehand::runtime)
    }

    #[inline(always)]
    fn face_module_path(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::module_path!)
    }

    #[inline(always)]
    fn face_line(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::line!)
    }

    #[inline(always)]
    fn face_column(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::column!)
    }

    #[inline(always)]
    fn face_panic(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::panic!)
    }

    #[inline(always)]
    fn face_env(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::env!)
    }

    #[inline(always)]
    fn face_option(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::option::Option)
    }

    #[inline(always)]
    fn face_result(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::result::Result)
    }

    #[inline(always)]
    fn face_vec_macro(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::vec!)
    }

    #[inline(always)]
    fn face_type_id(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::any::TypeId)
    }

    #[inline(always)]
    fn face_any(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::any::Any)
    }

    #[inline(always)]
    fn face_send(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::marker::Send)
    }

    #[inline(always)]
    fn face_sync(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::marker::Sync)
    }

    #[inline(always)]
    fn face_clone(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::clone::Clone)
    }

    #[inline(always)]
    fn face_from(&self) -> TokenStream {
        let span = self.span();

        quote_spanned!(span=> ::std::convert::From)
    }
}

impl<T: Spanned> Facade for T {}
