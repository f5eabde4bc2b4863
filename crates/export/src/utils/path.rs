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

use std::ops::RangeInclusive;

use proc_macro2::Span;
use syn::{spanned::Spanned, GenericArgument, Path, PathArguments, Type};

pub trait PathUtils<'a> {
    fn matches_bracketed(
        self,
        segments: &[&str],
        args: RangeInclusive<usize>,
    ) -> Option<PathMeta<'a>>;

    fn matches_default(self) -> Option<PathMeta<'a>>;

    fn matches_release(self) -> Option<PathMeta<'a>>;

    fn matches_signal(self) -> Option<PathMeta<'a>>;

    fn matches_vec(self) -> Option<PathMeta<'a>>;

    fn matches_string(self) -> Option<PathMeta<'a>>;
}

impl<'a> PathUtils<'a> for &'a Path {
    fn matches_bracketed(
        self,
        segments: &[&str],
        args: RangeInclusive<usize>,
    ) -> Option<PathMeta<'a>> {
        if self.segments.len() != segments.len() {
            return None;
        }

        let mut countdown = self.segments.len();

        for (this, pattern) in self.segments.iter().zip(segments.iter()) {
            if this.ident != *pattern {
                return None;
            }

            countdown -= 1;

            match &this.arguments {
                PathArguments::None => (),
                PathArguments::Parenthesized(..) => return None,
                PathArguments::AngleBracketed(arguments) => {
                    if countdown > 0 {
                        return None;
                    }

                    if !args.contains(&arguments.args.len()) {
                        return None;
                    }

                    let mut args = Vec::with_capacity(arguments.args.len());

                    for argument in arguments.args.iter() {
                        let GenericArgument::Type(argument) = argument else {
                            return None;
                        };

                        args.push(argument);
                    }

                    return Some(PathMeta {
                        span: self.span(),
                        args,
                    });
                }
            }
        }

        if *args.start() > 0 {
            return None;
        }

        Some(PathMeta {
            span: self.span(),
            args: Vec::new(),
        })
    }

    fn matches_default(self) -> Option<PathMeta<'a>> {
        self.matches_any(
            &[
                &["Default"],
                &["std", "default", "Default"],
                &["core", "default", "Default"],
            ],
            0..=0,
        )
    }

    fn matches_release(self) -> Option<PathMeta<'a>> {
        self.matches_any(
            &[&["Release"], &["stagehand", "runtime", "Release"]],
            0..=0,
        )
    }

    fn matches_signal(self) -> Option<PathMeta<'a>> {
        self.matches_any(
            &[
                &["Signal"],
                &["stagehand", "runtime", "Signal"],
                &["Trigger"],
                &["lady_deirdre", "sync", "Trigger"],
            ],
            0..=0,
        )
    }

    fn matches_vec(self) -> Option<PathMeta<'a>> {
        self.matches_any(
            &[&["Vec"], &["std", "vec", "Vec"], &["alloc", "vec", "Vec"]],
            1..=1,
        )
    }

    fn matches_string(self) -> Option<PathMeta<'a>> {
        self.matches_any(
            &[
                &["String"],
                &["std", "string", "String"],
                &["alloc", "string", "String"],
            ],
            0..=0,
        )
    }
}

trait MatchesAny<'a> {
    fn matches_any(self, patterns: &[&[&str]], args: RangeInclusive<usize>)
        -> Option<PathMeta<'a>>;
}

impl<'a> MatchesAny<'a> for &'a Path {
    #[inline]
    fn matches_any(
        self,
        patterns: &[&[&str]],
        args: RangeInclusive<usize>,
    ) -> Option<PathMeta<'a>> {
        patterns
            .iter()
            .find_map(|segments| self.matches_bracketed(segments, args.clone()))
    }
}

pub struct PathMeta<'a> {
    pub span: Span,
    pub args: Vec<&'a Type>,
}
