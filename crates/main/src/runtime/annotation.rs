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

use crate::runtime::RangeBounds;

/// The kind of an [Annotation], without its options.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Marker {
    /// Marks a type as a discoverable script.
    Script,
    /// Overrides the display name of any annotated item.
    Name,
    /// Sets the display description of any annotated item.
    Description,
    /// Marks the operation that prepares the script for running.
    Setup,
    /// Marks the main operation of the script.
    EntryPoint,
    /// Marks the operation that runs after the main operation.
    Cleanup,
    /// Marks an ad hoc operation that the user may trigger at any time.
    MiniScript,
    /// Marks a data member as a user-adjustable setting.
    Setting,
    /// Supplies explicit slider bounds to a numeric setting.
    Range,
    /// Marks a data member that receives the script's diagnostic sink.
    Sink,
}

impl Display for Marker {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Script => "script",
            Self::Name => "name",
            Self::Description => "description",
            Self::Setup => "setup",
            Self::EntryPoint => "entry point",
            Self::Cleanup => "cleanup",
            Self::MiniScript => "mini script",
            Self::Setting => "setting",
            Self::Range => "range",
            Self::Sink => "sink",
        })
    }
}

impl Marker {
    /// Returns true for the markers of the operations bound to a script's
    /// lifecycle: [Setup](Self::Setup), [EntryPoint](Self::EntryPoint) and
    /// [Cleanup](Self::Cleanup).
    #[inline(always)]
    pub const fn is_lifecycle(self) -> bool {
        matches!(self, Self::Setup | Self::EntryPoint | Self::Cleanup)
    }
}

/// A piece of annotation metadata attached to a type, an operation, or a data
/// member.
#[derive(Clone, PartialEq, Debug)]
pub enum Annotation {
    Script,
    Name(&'static str),
    Description(&'static str),
    Setup {
        /// The operation runs at most once per script instance.
        once: bool,
    },
    EntryPoint,
    Cleanup {
        /// The operation runs at most once per script instance.
        once: bool,
    },
    MiniScript {
        group: Option<&'static str>,
    },
    Setting {
        group: Option<&'static str>,
    },
    Range(RangeBounds),
    Sink,
}

impl Annotation {
    pub const fn marker(&self) -> Marker {
        match self {
            Self::Script => Marker::Script,
            Self::Name(..) => Marker::Name,
            Self::Description(..) => Marker::Description,
            Self::Setup { .. } => Marker::Setup,
            Self::EntryPoint => Marker::EntryPoint,
            Self::Cleanup { .. } => Marker::Cleanup,
            Self::MiniScript { .. } => Marker::MiniScript,
            Self::Setting { .. } => Marker::Setting,
            Self::Range(..) => Marker::Range,
            Self::Sink => Marker::Sink,
        }
    }
}

/// An ordered set of [Annotation]s of one item, queried by [Marker].
///
/// ```
/// use stagehand::runtime::{Annotation, Annotations, Marker};
///
/// let annotations = Annotations::new()
///     .with(Annotation::Setting { group: Some("Numbers") })
///     .with(Annotation::Name("Speed"));
///
/// assert!(annotations.has(Marker::Setting));
/// assert_eq!(annotations.name(), Some("Speed"));
/// assert_eq!(annotations.group(), Some("Numbers"));
/// assert_eq!(annotations.description(), None);
/// ```
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Annotations {
    items: Vec<Annotation>,
}

impl FromIterator<Annotation> for Annotations {
    #[inline(always)]
    fn from_iter<T: IntoIterator<Item = Annotation>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Annotations {
    #[inline(always)]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[inline(always)]
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.items.push(annotation);
        self
    }

    #[inline(always)]
    pub fn push(&mut self, annotation: Annotation) {
        self.items.push(annotation);
    }

    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.items.iter()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the first annotation of the `marker` kind.
    #[inline]
    pub fn get(&self, marker: Marker) -> Option<&Annotation> {
        self.items
            .iter()
            .find(|annotation| annotation.marker() == marker)
    }

    #[inline(always)]
    pub fn has(&self, marker: Marker) -> bool {
        self.get(marker).is_some()
    }

    /// Returns the explicit display name.
    pub fn name(&self) -> Option<&'static str> {
        match self.get(Marker::Name)? {
            Annotation::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the explicit display description.
    pub fn description(&self) -> Option<&'static str> {
        match self.get(Marker::Description)? {
            Annotation::Description(description) => Some(description),
            _ => None,
        }
    }

    /// Returns the group of the first [MiniScript](Marker::MiniScript) or
    /// [Setting](Marker::Setting) annotation.
    pub fn group(&self) -> Option<&'static str> {
        self.items.iter().find_map(|annotation| match annotation {
            Annotation::MiniScript { group } | Annotation::Setting { group } => *group,
            _ => None,
        })
    }

    /// Returns the explicit slider bounds.
    pub fn range(&self) -> Option<&RangeBounds> {
        match self.get(Marker::Range)? {
            Annotation::Range(bounds) => Some(bounds),
            _ => None,
        }
    }

    /// Returns true if the lifecycle annotation of the `marker` kind has the
    /// `once` option.
    pub fn once(&self, marker: Marker) -> bool {
        match self.get(marker) {
            Some(Annotation::Setup { once } | Annotation::Cleanup { once }) => *once,
            _ => false,
        }
    }
}
