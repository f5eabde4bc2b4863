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

use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, quote_spanned, ToTokens};
use syn::{Expr, LitStr, Member, Type};

use crate::utils::{
    context::{Context, SectionName},
    Facade,
    OriginRef,
    ParamShape,
};

/// The exporter function of a single macro invocation.
///
/// The function is placed into the `stagehandexpr` link section, and the
/// runtime calls it once to collect the declarations.
pub struct Group {
    section: SectionName,
    modules: Vec<TokenStream>,
    types: Vec<TokenStream>,
    impls: Vec<TokenStream>,
    entry_points: Vec<TokenStream>,
}

impl Default for Group {
    fn default() -> Self {
        let span = Context.span();
        let name = Context.name();

        let section = Context.make_section_name(name.as_str(), span);

        Self {
            section,
            modules: Vec::new(),
            types: Vec::new(),
            impls: Vec::new(),
            entry_points: Vec::new(),
        }
    }
}

impl ToTokens for Group {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = Context.span();
        let origin = Context.primary_origin();

        let intrinsics = span.face_intrinsics();
        let option = span.face_option();
        let vec_macro = span.face_vec_macro();

        let context = Context;
        let section = &self.section;

        let modules = &self.modules;
        let types = &self.types;
        let impls = &self.impls;
        let entry_points = &self.entry_points;

        if modules.is_empty() && types.is_empty() && impls.is_empty() && entry_points.is_empty()
        {
            return;
        }

        quote_spanned! (span=>
            #[no_mangle]
            extern "C" fn #section() {
                #[used]
                #[cfg_attr(
                    any(
                        target_os = "none",
                        target_os = "linux",
                        target_os = "android",
                        target_os = "fuchsia",
                        target_os = "psp",
                        target_os = "freebsd",
                    ),
                    link_section = "stagehandexpr",
                )]
                #[cfg_attr(
                    any(
                        target_os = "macos",
                        target_os = "ios",
                        target_os = "tvos",
                    ),
                    link_section = "__DATA,__stagehandexpr,regular,no_dead_strip",
                )]
                #[cfg_attr(
                    any(target_os = "illumos"),
                    link_section = "set_stagehandexpr",
                )]
                #[cfg_attr(
                    any(target_os = "windows"),
                    link_section = ".stagehandexpr$b",
                )]
                static __LINKED: extern "C" fn() = #section;

                let #option::Some(entry) = #intrinsics::ExportEntry::get(#section)
                else {
                    return;
                };

                let group = {
                    #context

                    #intrinsics::DeclarationGroup {
                        origin: &#origin,

                        modules: #vec_macro[#(
                            #modules,
                        )*],

                        types: #vec_macro[#(
                            #types,
                        )*],

                        impls: #vec_macro[#(
                            #impls,
                        )*],

                        entry_points: #vec_macro[#(
                            #entry_points,
                        )*],
                    }
                };

                #intrinsics::ExportEntry::export(entry, group);
            }
        )
        .to_tokens(tokens)
    }
}

impl Group {
    #[inline(always)]
    pub fn module(&mut self, declaration: ModuleDeclaration<'_>) -> &mut Self {
        self.modules.push(declaration.into_token_stream());

        self
    }

    #[inline(always)]
    pub fn ty(&mut self, declaration: TypeDeclaration<'_>) -> &mut Self {
        self.types.push(declaration.into_token_stream());

        self
    }

    #[inline(always)]
    pub fn implementation(&mut self, declaration: ImplDeclaration<'_>) -> &mut Self {
        self.impls.push(declaration.into_token_stream());

        self
    }

    #[inline(always)]
    pub fn entry_point(&mut self, declaration: EntryPointDeclaration) -> &mut Self {
        self.entry_points.push(declaration.into_token_stream());

        self
    }
}

pub struct ModuleDeclaration<'a> {
    pub ty: &'a Ident,
    pub name: Option<&'a LitStr>,
    pub version: Option<&'a LitStr>,
    pub description: Option<LitStr>,
}

impl<'a> ToTokens for ModuleDeclaration<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = self.ty.span();

        let intrinsics = span.face_intrinsics();
        let module_path = span.face_module_path();
        let env = span.face_env();
        let option = span.face_option();
        let type_id = span.face_type_id();

        let ty = self.ty;

        let name = match self.name {
            Some(name) => name.to_token_stream(),
            None => quote_spanned!(span=> #env("CARGO_PKG_NAME")),
        };

        let version = match self.version {
            Some(version) => version.to_token_stream(),
            None => quote_spanned!(span=> #env("CARGO_PKG_VERSION")),
        };

        let description = match &self.description {
            Some(description) => quote_spanned!(span=> #option::Some(#description)),
            None => quote_spanned!(span=> #option::None),
        };

        quote_spanned!(span=> {
            fn module() -> #intrinsics::ModuleDeclaration {
                #intrinsics::ModuleDeclaration {
                    name: #name,
                    version: #version,
                    description: #description,
                    path: #module_path(),
                    type_id: #type_id::of::<#ty>(),
                }
            }

            module as fn() -> #intrinsics::ModuleDeclaration
        })
        .to_tokens(tokens)
    }
}

pub struct TypeDeclaration<'a> {
    pub ty: &'a Ident,
    pub origin: OriginRef,
    pub generic: bool,
    pub annotations: Annotations,
    pub constructors: Vec<TokenStream>,
    pub members: Vec<TokenStream>,
}

impl<'a> ToTokens for TypeDeclaration<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = self.ty.span();

        let runtime = span.face_runtime();
        let intrinsics = span.face_intrinsics();
        let module_path = span.face_module_path();
        let vec_macro = span.face_vec_macro();

        let ty = self.ty;
        let name = LitStr::new(&ty.to_string(), span);
        let origin = &self.origin;
        let generic = self.generic;
        let annotations = &self.annotations;
        let constructors = &self.constructors;
        let members = &self.members;

        let base = match generic {
            true => quote_spanned!(span=> #runtime::TypeMeta::new(#name)),
            false => quote_spanned!(span=> #runtime::TypeMeta::of::<#ty>(#name)),
        };

        quote_spanned!(span=> {
            fn ty() -> #intrinsics::TypeDeclaration {
                #intrinsics::TypeDeclaration {
                    path: #module_path(),
                    meta: #runtime::TypeMeta {
                        origin: &#origin,
                        generic: #generic,
                        annotations: #annotations,
                        constructors: #vec_macro[#(#constructors,)*],
                        members: #vec_macro[#(#members,)*],
                        ..#base
                    },
                }
            }

            ty as fn() -> #intrinsics::TypeDeclaration
        })
        .to_tokens(tokens)
    }
}

pub struct ImplDeclaration<'a> {
    pub ty: &'a Type,
    pub constructors: Vec<TokenStream>,
    pub operations: Vec<TokenStream>,
    pub members: Vec<TokenStream>,
    pub release: bool,
}

impl<'a> ToTokens for ImplDeclaration<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = Context.span();

        let runtime = span.face_runtime();
        let intrinsics = span.face_intrinsics();
        let option = span.face_option();
        let type_id = span.face_type_id();
        let vec_macro = span.face_vec_macro();

        let ty = self.ty;
        let constructors = &self.constructors;
        let operations = &self.operations;
        let members = &self.members;

        let release = match self.release {
            true => quote_spanned!(span=> #option::Some(#runtime::release_fn::<#ty>())),
            false => quote_spanned!(span=> #option::None),
        };

        quote_spanned!(span=> {
            fn implementation() -> #intrinsics::ImplDeclaration {
                #intrinsics::ImplDeclaration {
                    type_id: #type_id::of::<#ty>(),
                    constructors: #vec_macro[#(#constructors,)*],
                    operations: #vec_macro[#(#operations,)*],
                    members: #vec_macro[#(#members,)*],
                    release: #release,
                }
            }

            implementation as fn() -> #intrinsics::ImplDeclaration
        })
        .to_tokens(tokens)
    }
}

pub struct EntryPointDeclaration {
    pub operation: TokenStream,
}

impl ToTokens for EntryPointDeclaration {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = Context.span();

        let intrinsics = span.face_intrinsics();
        let module_path = span.face_module_path();

        let operation = &self.operation;

        quote_spanned!(span=> {
            fn entry_point() -> #intrinsics::EntryPointDeclaration {
                #intrinsics::EntryPointDeclaration {
                    path: #module_path(),
                    operation: #operation,
                }
            }

            entry_point as fn() -> #intrinsics::EntryPointDeclaration
        })
        .to_tokens(tokens)
    }
}

/// An `Annotations` expression.
pub struct Annotations {
    span: Span,
    items: Vec<TokenStream>,
}

impl ToTokens for Annotations {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = self.span;
        let runtime = span.face_runtime();
        let items = &self.items;

        quote_spanned!(span=> #runtime::Annotations::new()#(.with(#items))*).to_tokens(tokens)
    }
}

impl Annotations {
    #[inline(always)]
    pub fn new(span: Span) -> Self {
        Self {
            span,
            items: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn script(&mut self) -> &mut Self {
        self.push(|runtime| quote!(#runtime::Annotation::Script))
    }

    #[inline(always)]
    pub fn name(&mut self, name: &LitStr) -> &mut Self {
        self.push(|runtime| quote!(#runtime::Annotation::Name(#name)))
    }

    #[inline(always)]
    pub fn description(&mut self, description: &LitStr) -> &mut Self {
        self.push(|runtime| quote!(#runtime::Annotation::Description(#description)))
    }

    #[inline(always)]
    pub fn setup(&mut self, once: bool) -> &mut Self {
        self.push(|runtime| quote!(#runtime::Annotation::Setup { once: #once }))
    }

    #[inline(always)]
    pub fn entry_point(&mut self) -> &mut Self {
        self.push(|runtime| quote!(#runtime::Annotation::EntryPoint))
    }

    #[inline(always)]
    pub fn cleanup(&mut self, once: bool) -> &mut Self {
        self.push(|runtime| quote!(#runtime::Annotation::Cleanup { once: #once }))
    }

    #[inline(always)]
    pub fn mini_script(&mut self, group: Option<&LitStr>) -> &mut Self {
        let group = Self::group(self.span, group);

        self.push(|runtime| quote!(#runtime::Annotation::MiniScript { group: #group }))
    }

    #[inline(always)]
    pub fn setting(&mut self, group: Option<&LitStr>) -> &mut Self {
        let group = Self::group(self.span, group);

        self.push(|runtime| quote!(#runtime::Annotation::Setting { group: #group }))
    }

    pub fn range(
        &mut self,
        min: Option<&Expr>,
        max: Option<&Expr>,
        step: Option<&Expr>,
    ) -> &mut Self {
        let min = min.map(|min| quote!(.min(#min)));
        let max = max.map(|max| quote!(.max(#max)));
        let step = step.map(|step| quote!(.step(#step)));

        self.push(|runtime| {
            quote!(#runtime::Annotation::Range(
                #runtime::RangeBounds::new()#min #max #step
            ))
        })
    }

    #[inline(always)]
    pub fn sink(&mut self) -> &mut Self {
        self.push(|runtime| quote!(#runtime::Annotation::Sink))
    }

    #[inline(always)]
    fn push(&mut self, f: impl FnOnce(TokenStream) -> TokenStream) -> &mut Self {
        let span = self.span;

        let item = f(span.face_runtime());

        self.items.push(quote_spanned!(span=> #item));

        self
    }

    fn group(span: Span, group: Option<&LitStr>) -> TokenStream {
        let option = span.face_option();

        match group {
            Some(group) => quote_spanned!(span=> #option::Some(#group)),
            None => quote_spanned!(span=> #option::None),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Ref,
    Mut,
    Static,
}

/// A declared parameter of an operation or a constructor.
pub struct Param {
    pub span: Span,
    pub name: String,
    pub shape: ParamShape,
}

impl ToTokens for Param {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = self.span;
        let runtime = span.face_runtime();

        let name = LitStr::new(&self.name, span);

        let shape = match &self.shape {
            ParamShape::Signal { .. } => quote_spanned!(span=> #runtime::ParamShape::Signal),
            ParamShape::Strings => quote_spanned!(span=> #runtime::ParamShape::Strings),
            ParamShape::Other(ty) => {
                let ty = LitStr::new(ty, span);

                quote_spanned!(span=> #runtime::ParamShape::Other(#ty))
            }
        };

        quote_spanned!(span=> #runtime::ParamMeta::new(#name, #shape)).to_tokens(tokens)
    }
}

/// An `OperationMeta` expression.
///
/// The operation is invocable if it is not generic and its parameters are
/// either empty or a single signal or a single list of strings. Otherwise the
/// generated invoke function reports that the call is unsupported.
pub struct Operation<'a> {
    pub span: Span,
    pub origin: OriginRef,
    pub name: &'a Ident,
    pub annotations: Annotations,
    pub generic: bool,
    pub receiver: Receiver,
    pub params: Vec<Param>,

    /// The type of the receiver. Must be set for non-static operations.
    pub this: Option<&'a Type>,

    /// The path of the callee without the arguments.
    pub callee: TokenStream,
}

impl<'a> ToTokens for Operation<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = self.span;

        let runtime = span.face_runtime();
        let option = span.face_option();
        let result = span.face_result();
        let vec_macro = span.face_vec_macro();

        let origin = &self.origin;
        let name = LitStr::new(&self.name.to_string(), span);
        let annotations = &self.annotations;
        let generic = self.generic;
        let params = &self.params;

        let receiver = match self.receiver {
            Receiver::Ref => quote_spanned!(span=> #runtime::Receiver::Ref),
            Receiver::Mut => quote_spanned!(span=> #runtime::Receiver::Mut),
            Receiver::Static => quote_spanned!(span=> #runtime::Receiver::Static),
        };

        let body = self.invoke_body(&name);

        quote_spanned!(span=> #runtime::OperationMeta {
            origin: &#origin,
            name: #name,
            annotations: #annotations,
            generic: #generic,
            receiver: #receiver,
            params: #vec_macro[#(#params,)*],
            invoke: {
                #[allow(unused_variables)]
                fn invoke(
                    instance: #option<&#runtime::Instance>,
                    args: &[#runtime::Arg],
                ) -> #result<#runtime::Value, #runtime::InvokeError> {
                    #body
                }

                invoke
            },
        })
        .to_tokens(tokens)
    }
}

impl<'a> Operation<'a> {
    fn invoke_body(&self, name: &LitStr) -> TokenStream {
        let span = self.span;
        let intrinsics = span.face_intrinsics();

        if self.generic {
            return quote_spanned!(span=> #intrinsics::unsupported(#name));
        }

        let (prepare, args) = match self.params.as_slice() {
            [] => (
                quote_spanned!(span=> #intrinsics::no_args(args, #name)?;),
                quote_spanned!(span=>),
            ),

            [Param {
                shape: ParamShape::Signal { by_ref },
                ..
            }] => (
                quote_spanned!(span=> let signal = #intrinsics::signal_arg(args, #name)?;),
                match by_ref {
                    true => quote_spanned!(span=> &signal),
                    false => quote_spanned!(span=> signal),
                },
            ),

            [Param {
                shape: ParamShape::Strings,
                ..
            }] => (
                quote_spanned!(span=> let strings = #intrinsics::strings_arg(args, #name)?;),
                quote_spanned!(span=> strings),
            ),

            _ => return quote_spanned!(span=> #intrinsics::unsupported(#name)),
        };

        let callee = &self.callee;

        let call = match (self.receiver, self.this) {
            (Receiver::Ref, Some(this)) => quote_spanned!(span=>
                #intrinsics::invoke_ref(instance, #name, |this: &#this| #callee(this, #args))
            ),

            (Receiver::Mut, Some(this)) => quote_spanned!(span=>
                #intrinsics::invoke_mut(instance, #name, |this: &mut #this| #callee(this, #args))
            ),

            _ => quote_spanned!(span=>
                #intrinsics::invoke_static(#name, || #callee(#args))
            ),
        };

        quote_spanned!(span=>
            #prepare
            #call
        )
    }
}

/// A `ConstructorMeta` expression.
pub struct Constructor<'a> {
    pub span: Span,
    pub name: &'a Ident,
    pub public: bool,
    pub params: Vec<Param>,

    /// An expression that creates the object. Present only for constructors
    /// without parameters.
    pub construct: Option<TokenStream>,
}

impl<'a> ToTokens for Constructor<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = self.span;

        let runtime = span.face_runtime();
        let option = span.face_option();
        let vec_macro = span.face_vec_macro();

        let name = LitStr::new(&self.name.to_string(), span);
        let public = self.public;
        let params = &self.params;

        let construct = match &self.construct {
            Some(construct) => quote_spanned!(span=> #option::Some({
                fn construct() -> #runtime::Instance {
                    #runtime::Instance::new(#construct)
                }

                construct
            })),

            None => quote_spanned!(span=> #option::None),
        };

        quote_spanned!(span=> #runtime::ConstructorMeta {
            name: #name,
            public: #public,
            params: #vec_macro[#(#params,)*],
            construct: #construct,
        })
        .to_tokens(tokens)
    }
}

/// A `MemberMeta` expression.
pub struct Field<'a> {
    pub span: Span,
    pub origin: OriginRef,
    pub name: String,
    pub annotations: Annotations,
    pub this: TokenStream,
    pub kind: FieldKind<'a>,
}

pub enum FieldKind<'a> {
    /// A struct field holding a script value.
    Value { member: &'a Member, ty: &'a Type },

    /// A struct field receiving the diagnostic sink.
    Sink { member: &'a Member },

    /// A getter method and an optional setter method.
    Property {
        ty: &'a Type,
        getter: &'a Ident,
        setter: Option<&'a Ident>,
        receiver: Receiver,
        callee: TokenStream,
    },
}

impl<'a> ToTokens for Field<'a> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let span = self.span;

        let core = span.face_core();
        let runtime = span.face_runtime();
        let intrinsics = span.face_intrinsics();
        let option = span.face_option();
        let any = span.face_any();
        let send = span.face_send();
        let sync = span.face_sync();
        let clone = span.face_clone();
        let from = span.face_from();

        let origin = &self.origin;
        let name = LitStr::new(&self.name, span);
        let annotations = &self.annotations;
        let this = &self.this;

        let (receiver, kind) = match &self.kind {
            FieldKind::Value { member, ty } => (
                quote_spanned!(span=> #runtime::MemberReceiver::Instance),
                quote_spanned!(span=> #runtime::MemberKind::Value {
                    kind: <#ty as #runtime::ScriptValue>::KIND,
                    nullable: <#ty as #runtime::ScriptValue>::NULLABLE,
                    get: {
                        fn get(
                            receiver: #option<&(dyn #any + #send + #sync)>,
                        ) -> #option<#runtime::Value> {
                            #intrinsics::get(receiver, |this: &#this| {
                                #runtime::ScriptValue::into_value(#clone::clone(&this.#member))
                            })
                        }

                        get
                    },
                    set: #option::Some({
                        fn set(
                            receiver: #option<&mut (dyn #any + #send + #sync)>,
                            value: #runtime::Value,
                        ) -> #option<()> {
                            #intrinsics::set(receiver, value, |this: &mut #this, value: #ty| {
                                this.#member = value;
                            })
                        }

                        set
                    }),
                }),
            ),

            FieldKind::Sink { member } => (
                quote_spanned!(span=> #runtime::MemberReceiver::Instance),
                quote_spanned!(span=> #runtime::MemberKind::Sink {
                    inject: {
                        fn inject(
                            receiver: &mut (dyn #any + #send + #sync),
                            sink: #core::sink::Sink,
                        ) -> #option<()> {
                            #intrinsics::inject(receiver, sink, |this: &mut #this, sink| {
                                this.#member = #from::from(sink);
                            })
                        }

                        inject
                    },
                }),
            ),

            FieldKind::Property {
                ty,
                getter,
                setter,
                receiver,
                callee,
            } => {
                let get = match receiver {
                    Receiver::Static => quote_spanned!(span=>
                        #option::Some(#runtime::ScriptValue::into_value(#callee::#getter()))
                    ),

                    _ => quote_spanned!(span=>
                        #intrinsics::get(receiver, |this: &#this| {
                            #runtime::ScriptValue::into_value(#callee::#getter(this))
                        })
                    ),
                };

                let set = match setter {
                    None => quote_spanned!(span=> #option::None),

                    Some(setter) => {
                        let body = match receiver {
                            Receiver::Static => quote_spanned!(span=>
                                #callee::#setter(
                                    <#ty as #runtime::ScriptValue>::from_value(value)?,
                                );

                                #option::Some(())
                            ),

                            _ => quote_spanned!(span=>
                                #intrinsics::set(receiver, value, |this: &mut #this, value: #ty| {
                                    #callee::#setter(this, value);
                                })
                            ),
                        };

                        quote_spanned!(span=> #option::Some({
                            #[allow(unused_variables)]
                            fn set(
                                receiver: #option<&mut (dyn #any + #send + #sync)>,
                                value: #runtime::Value,
                            ) -> #option<()> {
                                #body
                            }

                            set
                        }))
                    }
                };

                let member_receiver = match receiver {
                    Receiver::Static => quote_spanned!(span=> #runtime::MemberReceiver::Static),
                    _ => quote_spanned!(span=> #runtime::MemberReceiver::Instance),
                };

                (
                    member_receiver,
                    quote_spanned!(span=> #runtime::MemberKind::Value {
                        kind: <#ty as #runtime::ScriptValue>::KIND,
                        nullable: <#ty as #runtime::ScriptValue>::NULLABLE,
                        get: {
                            #[allow(unused_variables)]
                            fn get(
                                receiver: #option<&(dyn #any + #send + #sync)>,
                            ) -> #option<#runtime::Value> {
                                #get
                            }

                            get
                        },
                        set: #set,
                    }),
                )
            }
        };

        quote_spanned!(span=> #runtime::MemberMeta {
            origin: &#origin,
            name: #name,
            annotations: #annotations,
            receiver: #receiver,
            kind: #kind,
        })
        .to_tokens(tokens)
    }
}
