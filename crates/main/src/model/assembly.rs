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

use std::fmt::{Display, Formatter};

use compact_str::CompactString;
use log::warn;

use crate::{
    discovery::DISCOVERY_LOG,
    model::{Groups, InvocableMember, ManagedResource, ScriptId, ScriptSetting},
    runtime::{Instance, InvokeError, Marker, Signal},
    sink::Sink,
};

/// A non-fatal problem found while building a [ScriptAssembly].
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum BuildWarning {
    /// A script type has more than one operation with the same lifecycle
    /// marker. The first discovered operation is used, and the others are
    /// ignored.
    DuplicateLifecycle {
        /// The script that owns the operations.
        script: ScriptId,

        /// The name of the script type.
        ty: CompactString,

        /// The lifecycle marker: [Setup](Marker::Setup),
        /// [EntryPoint](Marker::EntryPoint) or [Cleanup](Marker::Cleanup).
        marker: Marker,

        /// The operation that is used.
        used: CompactString,

        /// The operation that is ignored.
        ignored: CompactString,
    },
}

impl Display for BuildWarning {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateLifecycle {
                ty,
                marker,
                used,
                ignored,
                ..
            } => formatter.write_fmt(format_args!(
                "script type \"{ty}\" has more than one {marker} operation: \
                \"{used}\" is used, \"{ignored}\" is ignored",
            )),
        }
    }
}

/// The owning collection of all [Script]s discovered in one module.
///
/// The assembly is the only owner of the scripts' instances. When the
/// assembly is [released](Self::release) or dropped, it releases the
/// [managed resources](Script::resource) of all scripts.
///
/// ```
/// use stagehand::{discovery::AssemblyBuilder, runtime::ModuleMeta};
///
/// let module = ModuleMeta::new("empty");
///
/// let assembly = AssemblyBuilder::default().parse(Some(&module)).unwrap();
///
/// assert_eq!(assembly.name(), "empty");
/// assert!(assembly.is_empty());
/// assert!(!assembly.is_generic_fallback());
/// ```
#[derive(Debug)]
pub struct ScriptAssembly {
    name: CompactString,
    description: Option<CompactString>,
    scripts: Vec<Script>,
    generic_fallback: bool,
    warnings: Vec<BuildWarning>,
    released: bool,
}

impl Drop for ScriptAssembly {
    fn drop(&mut self) {
        self.release();

        for script in &self.scripts {
            let _ = script.id.clear_name();
        }
    }
}

impl ScriptAssembly {
    #[inline(always)]
    pub(crate) fn new(name: &str, description: Option<&str>) -> Self {
        Self {
            name: CompactString::from(name),
            description: description.map(CompactString::from),
            scripts: Vec::new(),
            generic_fallback: false,
            warnings: Vec::new(),
            released: false,
        }
    }

    #[inline(always)]
    pub(crate) fn push(&mut self, script: Script) {
        self.generic_fallback = self.generic_fallback || script.generic_fallback;
        self.scripts.push(script);
    }

    #[inline(always)]
    pub(crate) fn warn(&mut self, warning: BuildWarning) {
        self.warnings.push(warning);
    }

    /// The name of the module.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The scripts in the order of their discovery.
    #[inline(always)]
    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    #[inline]
    pub fn script(&self, id: ScriptId) -> Option<&Script> {
        self.scripts.iter().find(|script| script.id == id)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Returns true if the assembly holds the single script synthesized from
    /// the module's entry point.
    #[inline(always)]
    pub fn is_generic_fallback(&self) -> bool {
        self.generic_fallback
    }

    #[inline(always)]
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    #[inline(always)]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Releases the managed resources of all scripts.
    ///
    /// The function waits for the script operations that are currently
    /// running. Subsequent calls do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }

        self.released = true;

        for script in &mut self.scripts {
            let Some(resource) = &mut script.resource else {
                continue;
            };

            if let Err(error) = resource.release() {
                let name = &script.name;

                warn!(target: DISCOVERY_LOG, "Script \"{name}\" release failure. {error}");
            }
        }
    }
}

/// One discovered script: an instance of a script type together with its
/// lifecycle operations, mini scripts and settings.
#[derive(Debug)]
pub struct Script {
    pub(crate) id: ScriptId,
    pub(crate) name: CompactString,
    pub(crate) description: Option<CompactString>,
    pub(crate) instance: Option<Instance>,
    pub(crate) setup: Option<InvocableMember>,
    pub(crate) entry_point: Option<InvocableMember>,
    pub(crate) cleanup: Option<InvocableMember>,
    pub(crate) mini_scripts: Vec<InvocableMember>,
    pub(crate) mini_script_groups: Groups,
    pub(crate) settings: Vec<ScriptSetting>,
    pub(crate) setting_groups: Groups,
    pub(crate) resource: Option<ManagedResource>,
    pub(crate) sink: Option<Sink>,
    pub(crate) generic_fallback: bool,
}

impl Script {
    #[inline(always)]
    pub(crate) fn new(id: ScriptId, name: &str) -> Self {
        Self {
            id,
            name: CompactString::from(name),
            description: None,
            instance: None,
            setup: None,
            entry_point: None,
            cleanup: None,
            mini_scripts: Vec::new(),
            mini_script_groups: Groups::default(),
            settings: Vec::new(),
            setting_groups: Groups::default(),
            resource: None,
            sink: None,
            generic_fallback: false,
        }
    }

    // Points every member back to this script. Must be called once the
    // script's content is complete.
    pub(crate) fn adopt(&mut self) {
        let id = self.id;

        for member in [&mut self.setup, &mut self.entry_point, &mut self.cleanup]
            .into_iter()
            .flatten()
        {
            member.set_parent(id);
        }

        for member in &mut self.mini_scripts {
            member.set_parent(id);
        }

        for setting in &mut self.settings {
            setting.set_parent(id);
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ScriptId {
        self.id
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The instance of the script type. None for the fallback script.
    #[inline(always)]
    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    #[inline(always)]
    pub fn setup(&self) -> Option<&InvocableMember> {
        self.setup.as_ref()
    }

    #[inline(always)]
    pub fn entry_point(&self) -> Option<&InvocableMember> {
        self.entry_point.as_ref()
    }

    #[inline(always)]
    pub fn cleanup(&self) -> Option<&InvocableMember> {
        self.cleanup.as_ref()
    }

    /// The mini scripts in the order of their discovery.
    #[inline(always)]
    pub fn mini_scripts(&self) -> &[InvocableMember] {
        &self.mini_scripts
    }

    /// The groups of the [mini scripts](Self::mini_scripts).
    #[inline(always)]
    pub fn mini_script_groups(&self) -> &Groups {
        &self.mini_script_groups
    }

    /// Iterates over the mini scripts of the group `name`.
    pub fn mini_script_group(&self, name: &str) -> impl Iterator<Item = &InvocableMember> + '_ {
        self.mini_script_groups
            .get(name)
            .unwrap_or_default()
            .iter()
            .filter_map(|index| self.mini_scripts.get(*index))
    }

    /// The settings in the order of their discovery.
    #[inline(always)]
    pub fn settings(&self) -> &[ScriptSetting] {
        &self.settings
    }

    /// The groups of the [settings](Self::settings).
    #[inline(always)]
    pub fn setting_groups(&self) -> &Groups {
        &self.setting_groups
    }

    /// Iterates over the settings of the group `name`.
    pub fn setting_group(&self, name: &str) -> impl Iterator<Item = &ScriptSetting> + '_ {
        self.setting_groups
            .get(name)
            .unwrap_or_default()
            .iter()
            .filter_map(|index| self.settings.get(*index))
    }

    /// Looks up a setting by its display name.
    #[inline]
    pub fn setting(&self, name: &str) -> Option<&ScriptSetting> {
        self.settings.iter().find(|setting| setting.name() == name)
    }

    /// Present if the script type implements
    /// [Release](crate::runtime::Release).
    #[inline(always)]
    pub fn resource(&self) -> Option<&ManagedResource> {
        self.resource.as_ref()
    }

    /// The diagnostic sink created for the script, if any.
    #[inline(always)]
    pub fn sink(&self) -> Option<&Sink> {
        self.sink.as_ref()
    }

    /// Returns true if the script was synthesized from the module's entry
    /// point.
    #[inline(always)]
    pub fn is_generic_fallback(&self) -> bool {
        self.generic_fallback
    }

    /// Runs the script's lifecycle: the setup, the entry point, and the
    /// cleanup operations, whichever exist.
    ///
    /// The run stops at the first failed operation, except that the cleanup
    /// still runs after a failed entry point. The first error is returned.
    pub fn run(&self, signal: Option<&Signal>) -> Result<(), InvokeError> {
        if let Some(setup) = &self.setup {
            let _ = setup.invoke(signal)?;
        }

        let result = match &self.entry_point {
            Some(entry_point) => entry_point.invoke(signal).map(|_| ()),
            None => Ok(()),
        };

        if let Some(cleanup) = &self.cleanup {
            let cleanup = cleanup.invoke(signal).map(|_| ());

            return result.and(cleanup);
        }

        result
    }
}
