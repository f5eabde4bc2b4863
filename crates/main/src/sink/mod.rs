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

//! The diagnostic sink boundary.
//!
//! Every discovered [Script](crate::model::Script) may own a [Sink]: a cheap
//! clonable handle through which the script's code reports diagnostics. The
//! sinks are created by a [SinkDirectory] that the
//! [AssemblyBuilder](crate::discovery::AssemblyBuilder) calls once per
//! script. If the script type has a data member marked with
//! `#[script(sink)]`, the builder stores the sink there.
//!
//! The crate provides two directories: [LogDirectory], which forwards the
//! records to the [log] facade, and [StderrDirectory], which prints them
//! to the terminal. The [SinkSplitter] fans one sink out to many.

mod facade;
mod splitter;
mod stderr;

use std::{
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

pub use ::log::Level;

pub use crate::sink::{
    facade::{LogDirectory, SCRIPT_LOG},
    splitter::SinkSplitter,
    stderr::{StderrDirectory, StderrSinkConfig},
};
use crate::model::ScriptId;

/// The receiving end of a [Sink].
pub trait SinkBackend: Send + Sync + 'static {
    /// Returns true if the backend accepts the records of the `level`.
    fn enabled(&self, level: Level) -> bool;

    /// Writes a record.
    fn write(&self, level: Level, message: &str);
}

/// A handle of a diagnostic sink.
///
/// The [Default] sink is muted: it accepts nothing and writes nowhere. This
/// makes `Sink` a convenient type for a `#[script(sink)]` field of a
/// `#[derive(Default)]` script type.
///
/// ```
/// use stagehand::sink::{Level, Sink};
///
/// let sink = Sink::default();
///
/// assert!(sink.is_muted());
/// assert!(!sink.is_enabled(Level::Error));
///
/// sink.warn("nobody listens");
/// ```
#[derive(Clone, Default)]
pub struct Sink {
    backend: Option<Arc<dyn SinkBackend>>,
}

impl Debug for Sink {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.backend {
            Some(_) => formatter.write_str("Sink"),
            None => formatter.write_str("Sink(muted)"),
        }
    }
}

impl Sink {
    #[inline(always)]
    pub fn new(backend: impl SinkBackend) -> Self {
        Self {
            backend: Some(Arc::new(backend)),
        }
    }

    #[inline(always)]
    pub const fn muted() -> Self {
        Self { backend: None }
    }

    #[inline(always)]
    pub fn is_muted(&self) -> bool {
        self.backend.is_none()
    }

    #[inline]
    pub fn is_enabled(&self, level: Level) -> bool {
        match &self.backend {
            Some(backend) => backend.enabled(level),
            None => false,
        }
    }

    /// Writes the `message` if the sink accepts the `level`. The message is
    /// not formatted otherwise.
    pub fn log(&self, level: Level, message: impl Display) {
        let Some(backend) = &self.backend else {
            return;
        };

        if !backend.enabled(level) {
            return;
        }

        backend.write(level, &message.to_string());
    }

    #[inline(always)]
    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message)
    }

    #[inline(always)]
    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message)
    }

    #[inline(always)]
    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message)
    }

    #[inline(always)]
    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message)
    }

    #[inline(always)]
    pub fn trace(&self, message: impl Display) {
        self.log(Level::Trace, message)
    }
}

/// A keyed factory of [Sink]s.
///
/// The [AssemblyBuilder](crate::discovery::AssemblyBuilder) calls
/// [create_sink](SinkDirectory::create_sink) once for every script it builds,
/// right after the script's instance is constructed. Returning None leaves
/// the script without a sink.
///
/// Any `Fn(ScriptId, &str) -> Sink` function is a directory too.
pub trait SinkDirectory: Send + Sync + 'static {
    fn create_sink(&self, id: ScriptId, name: &str) -> Option<Sink>;
}

impl<F> SinkDirectory for F
where
    F: Fn(ScriptId, &str) -> Sink + Send + Sync + 'static,
{
    #[inline(always)]
    fn create_sink(&self, id: ScriptId, name: &str) -> Option<Sink> {
        Some(self(id, name))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use crate::sink::{Level, Sink, SinkBackend};

    #[derive(Clone, Default)]
    pub(crate) struct Records {
        pub(crate) level: Option<Level>,
        pub(crate) records: Arc<Mutex<Vec<(Level, String)>>>,
    }

    impl SinkBackend for Records {
        fn enabled(&self, level: Level) -> bool {
            match self.level {
                Some(max) => level <= max,
                None => true,
            }
        }

        fn write(&self, level: Level, message: &str) {
            self.records
                .lock()
                .unwrap()
                .push((level, String::from(message)));
        }
    }

    impl Records {
        pub(crate) fn take(&self) -> Vec<(Level, String)> {
            std::mem::take(&mut *self.records.lock().unwrap())
        }
    }

    #[test]
    fn test_sink_levels() {
        let records = Records {
            level: Some(Level::Info),
            ..Records::default()
        };

        let sink = Sink::new(records.clone());

        sink.info("started");
        sink.debug("skipped");
        sink.error(format_args!("failed {}", 3));

        assert!(sink.is_enabled(Level::Warn));
        assert!(!sink.is_enabled(Level::Trace));

        assert_eq!(
            records.take(),
            vec![
                (Level::Info, String::from("started")),
                (Level::Error, String::from("failed 3")),
            ],
        );
    }
}
