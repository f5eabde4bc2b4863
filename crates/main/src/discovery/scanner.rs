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

use crate::runtime::{Marker, ModuleMeta, TypeMeta};

/// Enumerates the types of the `module` that carry the
/// [Script](Marker::Script) marker, in the order of their declaration.
///
/// An absent module has no script types.
pub fn scan(module: Option<&ModuleMeta>) -> impl Iterator<Item = &TypeMeta> + '_ {
    module
        .into_iter()
        .flat_map(|module| module.types.iter())
        .filter(|ty| ty.annotations.has(Marker::Script))
}

#[cfg(test)]
mod tests {
    use crate::{
        discovery::scan,
        runtime::{Annotation, Annotations, ModuleMeta, TypeMeta},
    };

    #[test]
    fn test_scan_marked_types() {
        let module = ModuleMeta::new("demo")
            .with_type(TypeMeta {
                annotations: Annotations::new().with(Annotation::Script),
                ..TypeMeta::new("First")
            })
            .with_type(TypeMeta::new("Helper"))
            .with_type(TypeMeta {
                annotations: Annotations::new()
                    .with(Annotation::Name("Named"))
                    .with(Annotation::Script),
                ..TypeMeta::new("Second")
            });

        let names = scan(Some(&module)).map(|ty| ty.name).collect::<Vec<_>>();

        assert_eq!(names, ["First", "Second"]);
        assert_eq!(scan(None).count(), 0);
    }
}
