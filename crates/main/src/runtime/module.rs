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
    any::TypeId,
    fmt::{Display, Formatter},
    ops::Deref,
};

use ahash::AHashMap;
use lady_deirdre::sync::Lazy;
use semver::{Version, VersionReq};

use crate::runtime::{
    OperationMeta,
    RustOrigin,
    TypeMeta,
    __intrinsics::{DeclarationGroup, ImplDeclaration},
};

/// A type that represents the discoverable module of a crate.
///
/// This trait is automatically implemented on a struct type when you mark it
/// with `#[script(module)]`.
///
/// ```
/// use stagehand::{runtime::ScriptModule, script};
///
/// #[script(module)]
/// struct Module;
///
/// assert_eq!(Module::name(), "stagehand");
/// ```
pub trait ScriptModule {
    /// Returns the display name of the module.
    ///
    /// This is a shortcut for [ModuleMeta::name].
    #[inline(always)]
    fn name() -> &'static str {
        Self::meta().name
    }

    /// Returns the version of the module's crate.
    ///
    /// This is a shortcut for [ModuleMeta::version].
    #[inline(always)]
    fn version() -> &'static str {
        Self::meta().version
    }

    /// Returns a reference to the full metadata object of the module.
    fn meta() -> &'static ModuleMeta;
}

/// The descriptor table of a loaded module: the input of the
/// [AssemblyBuilder](crate::discovery::AssemblyBuilder).
///
/// The `#[script(module)]` macro creates one ModuleMeta per marked struct.
/// The module owns every `#[script]` type and every
/// `#[script(entry_point)]` function declared in the Rust module of the
/// struct (and in its submodules, unless a submodule declares a module of
/// its own). You can obtain this object through the [ScriptModule::meta]
/// function or look it up with [ModuleMeta::of].
///
/// A ModuleMeta can also be assembled manually from [TypeMeta] and
/// [OperationMeta] objects:
///
/// ```
/// use stagehand::runtime::{ModuleMeta, TypeMeta};
///
/// let meta = ModuleMeta::new("demo")
///     .with_description("Manually described module.")
///     .with_type(TypeMeta::new("Nothing"));
///
/// assert_eq!(meta.types.len(), 1);
/// assert!(meta.entry_point.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct ModuleMeta {
    /// The place where the module was declared.
    pub origin: &'static RustOrigin,

    /// The display name of the module. By default, the crate name.
    pub name: &'static str,

    /// The version of the module's crate.
    pub version: &'static str,

    pub description: Option<&'static str>,

    /// The types of the module in the order of their declaration.
    pub types: Vec<TypeMeta>,

    /// The program entry point of the module, if any.
    pub entry_point: Option<OperationMeta>,
}

impl PartialEq for ModuleMeta {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.origin == other.origin
    }
}

impl Display for ModuleMeta {
    #[inline]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name)?;

        if formatter.alternate() {
            formatter.write_fmt(format_args!("@{}", self.version))?;
        }

        Ok(())
    }
}

impl ModuleMeta {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            origin: RustOrigin::nil(),
            name,
            version: "0.0.0",
            description: None,
            types: Vec::new(),
            entry_point: None,
        }
    }

    #[inline(always)]
    pub fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    #[inline(always)]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    #[inline(always)]
    pub fn with_type(mut self, ty: TypeMeta) -> Self {
        self.types.push(ty);
        self
    }

    #[inline(always)]
    pub fn with_entry_point(mut self, entry_point: OperationMeta) -> Self {
        self.entry_point = Some(entry_point);
        self
    }

    /// Looks up a module declared with `#[script(module)]` by its `name` and
    /// `version` requirement.
    ///
    /// The format of the `version` string is the same as used in the
    /// `[dependencies]` section of `Cargo.toml`: `1.0` matches the latest
    /// compatible version, and `=1.0.2` matches the exact version.
    ///
    /// Returns None if no module matches the name and the requirement.
    pub fn of(name: &str, version: &str) -> Option<&'static Self> {
        let registry = ModuleRegistry::get();

        let version_set = registry.index.get(name)?;

        let requirement = VersionReq::parse(version).ok()?;

        let mut candidate: Option<(&Version, usize)> = None;

        for (version, index) in version_set {
            if !requirement.matches(version) {
                continue;
            }

            match candidate {
                Some((previous, _)) if previous > version => (),
                _ => candidate = Some((version, *index)),
            }
        }

        let (_, index) = candidate?;

        registry.modules.get(index)
    }

    /// Returns the module declared by the `#[script(module)]` struct with the
    /// `type_id`.
    #[inline]
    pub(crate) fn by_type(type_id: &TypeId) -> Option<&'static Self> {
        let registry = ModuleRegistry::get();

        let index = *registry.types.get(type_id)?;

        registry.modules.get(index)
    }
}

struct ModuleRegistry {
    modules: Vec<ModuleMeta>,
    index: AHashMap<&'static str, AHashMap<Version, usize>>,
    types: AHashMap<TypeId, usize>,
}

impl ModuleRegistry {
    fn get() -> &'static Self {
        static REGISTRY: Lazy<ModuleRegistry> = Lazy::new(ModuleRegistry::build);

        REGISTRY.deref()
    }

    fn build() -> Self {
        let mut modules = Vec::new();
        let mut paths = Vec::new();
        let mut index = AHashMap::<&'static str, AHashMap<Version, usize>>::new();
        let mut types = AHashMap::new();

        let mut groups = DeclarationGroup::enumerate().collect::<Vec<_>>();

        groups.sort_by(|a, b| a.origin.cmp(b.origin));

        for group in &groups {
            let origin = group.origin;

            for declaration in &group.modules {
                let declaration = declaration();

                let version = match Version::parse(declaration.version) {
                    Ok(version) => version,

                    Err(error) => {
                        let name = declaration.name;
                        let version = declaration.version;

                        origin.blame(&format!(
                            "Module {name}@{version} version parse error. {error}",
                        ))
                    }
                };

                let version_set = index.entry(declaration.name).or_default();

                if let Some(previous) = version_set.get(&version) {
                    let name = declaration.name;
                    let version = declaration.version;
                    let previous = modules
                        .get(*previous)
                        .map(|module: &ModuleMeta| module.origin)
                        .unwrap_or(RustOrigin::nil());

                    origin.blame(&format!(
                        "Module {name}@{version} already declared in {previous}.",
                    ))
                }

                if paths.contains(&declaration.path) {
                    let path = declaration.path;

                    origin.blame(&format!(
                        "Rust module \"{path}\" already has a script module declaration.",
                    ))
                }

                let _ = version_set.insert(version, modules.len());
                let _ = types.insert(declaration.type_id, modules.len());

                paths.push(declaration.path);
                modules.push(ModuleMeta {
                    origin,
                    name: declaration.name,
                    version: declaration.version,
                    description: declaration.description,
                    types: Vec::new(),
                    entry_point: None,
                });
            }
        }

        let mut impls = AHashMap::<TypeId, Vec<ImplDeclaration>>::new();

        for group in &groups {
            for declaration in &group.impls {
                let declaration = declaration();

                impls
                    .entry(declaration.type_id)
                    .or_default()
                    .push(declaration);
            }
        }

        for group in &groups {
            let origin = group.origin;

            for declaration in &group.types {
                let mut declaration = declaration();

                let Some(module) = enclosing(&paths, declaration.path) else {
                    continue;
                };

                if let Some(type_id) = &declaration.meta.type_id {
                    for implementation in impls.remove(type_id).unwrap_or_default() {
                        merge(origin, &mut declaration.meta, implementation);
                    }
                }

                declaration
                    .meta
                    .operations
                    .sort_by(|a, b| a.origin.cmp(b.origin));

                declaration
                    .meta
                    .members
                    .sort_by(|a, b| a.origin.cmp(b.origin));

                if let Some(module) = modules.get_mut(module) {
                    module.types.push(declaration.meta);
                }
            }

            for declaration in &group.entry_points {
                let declaration = declaration();

                let Some(module) = enclosing(&paths, declaration.path) else {
                    continue;
                };

                let Some(module) = modules.get_mut(module) else {
                    continue;
                };

                if let Some(previous) = &module.entry_point {
                    let name = module.name;
                    let previous = previous.origin;

                    origin.blame(&format!(
                        "Module {name} already has an entry point declared in {previous}.",
                    ))
                }

                module.entry_point = Some(declaration.operation);
            }
        }

        Self {
            modules,
            index,
            types,
        }
    }
}

// Returns the index of the innermost module declaration that encloses the Rust
// module `path`.
fn enclosing(paths: &[&'static str], path: &str) -> Option<usize> {
    let mut candidate: Option<(usize, usize)> = None;

    for (index, module) in paths.iter().enumerate() {
        let encloses = match path.strip_prefix(module) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        };

        if !encloses {
            continue;
        }

        match candidate {
            Some((_, length)) if length >= module.len() => (),
            _ => candidate = Some((index, module.len())),
        }
    }

    Some(candidate?.0)
}

fn merge(origin: &'static RustOrigin, meta: &mut TypeMeta, implementation: ImplDeclaration) {
    meta.constructors.extend(implementation.constructors);
    meta.operations.extend(implementation.operations);
    meta.members.extend(implementation.members);

    if let Some(release) = implementation.release {
        if meta.release.is_some() {
            let name = meta.name;

            origin.blame(&format!("Type {name} already implements Release."))
        }

        meta.release = Some(release);
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::module::enclosing;

    #[test]
    fn test_innermost_enclosing_module() {
        let paths = ["app", "app::tools", "other"];

        assert_eq!(enclosing(&paths, "app"), Some(0));
        assert_eq!(enclosing(&paths, "app::scripts"), Some(0));
        assert_eq!(enclosing(&paths, "app::tools::hammer"), Some(1));
        assert_eq!(enclosing(&paths, "application"), None);
        assert_eq!(enclosing(&paths, "unrelated::app"), None);
    }
}
