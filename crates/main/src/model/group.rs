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

use compact_str::CompactString;

/// An ordered mapping from group names to the positions of the grouped items.
///
/// The groups are ordered by the first appearance of their names, and the
/// items within a group keep their discovery order. The positions index the
/// list the groups were built from (e.g., [Script::mini_scripts] or
/// [Script::settings]).
///
/// [Script::mini_scripts]: crate::model::Script::mini_scripts
/// [Script::settings]: crate::model::Script::settings
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Groups {
    entries: Vec<(CompactString, Vec<usize>)>,
}

impl Groups {
    #[inline(always)]
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds the groups from the group name of each item, substituting
    /// `default` for the items without a group.
    pub(crate) fn collect<'a>(
        groups: impl IntoIterator<Item = Option<&'a str>>,
        default: &str,
    ) -> Self {
        let mut result = Self::new();

        for (index, group) in groups.into_iter().enumerate() {
            result.insert(group.unwrap_or(default), index);
        }

        result
    }

    fn insert(&mut self, name: &str, index: usize) {
        match self.entries.iter_mut().find(|(entry, _)| entry.as_str() == name) {
            Some((_, indices)) => indices.push(index),
            None => self.entries.push((CompactString::from(name), vec![index])),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the positions of the items in the group `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.entries
            .iter()
            .find(|(entry, _)| entry.as_str() == name)
            .map(|(_, indices)| indices.as_slice())
    }

    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.entries
            .iter()
            .map(|(name, indices)| (name.as_str(), indices.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Groups;

    #[test]
    fn test_groups_order() {
        let groups = Groups::collect(
            [Some("Numbers"), None, Some("Text"), Some("Numbers"), None],
            "Other",
        );

        assert_eq!(groups.len(), 3);
        assert_eq!(groups.names().collect::<Vec<_>>(), ["Numbers", "Other", "Text"]);
        assert_eq!(groups.get("Numbers"), Some([0, 3].as_slice()));
        assert_eq!(groups.get("Other"), Some([1, 4].as_slice()));
        assert_eq!(groups.get("Text"), Some([2].as_slice()));
        assert_eq!(groups.get("Missing"), None);
    }
}
