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

use crate::sink::{Level, Sink, SinkBackend};

/// A [SinkBackend] that forwards every record to all inner sinks.
///
/// The splitter accepts a level only when every inner sink accepts it.
///
/// ```
/// use stagehand::sink::{Level, Sink, SinkSplitter};
///
/// let splitter = SinkSplitter::new().with(Sink::muted());
///
/// let sink = Sink::new(splitter);
///
/// assert!(!sink.is_enabled(Level::Error));
/// ```
#[derive(Clone, Default, Debug)]
pub struct SinkSplitter {
    sinks: Vec<Sink>,
}

impl FromIterator<Sink> for SinkSplitter {
    #[inline(always)]
    fn from_iter<T: IntoIterator<Item = Sink>>(iter: T) -> Self {
        Self {
            sinks: iter.into_iter().collect(),
        }
    }
}

impl SinkBackend for SinkSplitter {
    #[inline]
    fn enabled(&self, level: Level) -> bool {
        self.sinks.iter().all(|sink| sink.is_enabled(level))
    }

    fn write(&self, level: Level, message: &str) {
        for sink in &self.sinks {
            sink.log(level, message);
        }
    }
}

impl SinkSplitter {
    #[inline(always)]
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    #[inline(always)]
    pub fn with(mut self, sink: Sink) -> Self {
        self.sinks.push(sink);
        self
    }

    #[inline(always)]
    pub fn push(&mut self, sink: Sink) {
        self.sinks.push(sink);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::sink::{tests::Records, Level, Sink, SinkSplitter};

    #[test]
    fn test_splitter_fan_out() {
        let verbose = Records::default();

        let quiet = Records {
            level: Some(Level::Warn),
            ..Records::default()
        };

        let sink = Sink::new(
            SinkSplitter::new()
                .with(Sink::new(verbose.clone()))
                .with(Sink::new(quiet.clone())),
        );

        assert!(sink.is_enabled(Level::Error));
        assert!(sink.is_enabled(Level::Warn));
        assert!(!sink.is_enabled(Level::Info));

        sink.info("dropped");
        sink.warn("delivered");

        assert_eq!(verbose.take(), vec![(Level::Warn, String::from("delivered"))]);
        assert_eq!(quiet.take(), vec![(Level::Warn, String::from("delivered"))]);
    }
}
