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
    io::{stderr, Write},
    time::Instant,
};

use compact_str::CompactString;
use lady_deirdre::format::{Color, Style, TerminalString};
use log::{Level, LevelFilter};

use crate::{
    model::ScriptId,
    sink::{Sink, SinkBackend, SinkDirectory},
};

/// A configuration of the [StderrDirectory] sinks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub struct StderrSinkConfig {
    /// The most verbose level the sinks accept.
    ///
    /// The default value is [LevelFilter::Debug] in debug builds and
    /// [LevelFilter::Info] in release builds.
    pub level: LevelFilter,

    /// If set, the script names are printed in bold and colored by the
    /// record's level.
    ///
    /// The default value is true.
    pub colors: bool,
}

impl Default for StderrSinkConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl StderrSinkConfig {
    /// The default constructor for this configuration object.
    #[inline(always)]
    pub const fn new() -> Self {
        let level;

        #[cfg(debug_assertions)]
        {
            level = LevelFilter::Debug;
        }

        #[cfg(not(debug_assertions))]
        {
            level = LevelFilter::Info;
        }

        Self {
            level,
            colors: true,
        }
    }
}

/// A [SinkDirectory] that prints the records of every script to the
/// standard error stream.
///
/// Each line starts with the time elapsed since the directory was created,
/// followed by the script's name and identifier:
///
/// ```text
/// 00:00:03 [Test Script #1] Setup complete.
/// ```
#[derive(Clone, Debug)]
pub struct StderrDirectory {
    config: StderrSinkConfig,
    start: Instant,
}

impl Default for StderrDirectory {
    #[inline(always)]
    fn default() -> Self {
        Self::new(StderrSinkConfig::new())
    }
}

impl SinkDirectory for StderrDirectory {
    fn create_sink(&self, id: ScriptId, name: &str) -> Option<Sink> {
        if self.config.level == LevelFilter::Off {
            return None;
        }

        Some(Sink::new(StderrSink {
            config: self.config,
            start: self.start,
            target: format!("[{name} #{}]", id.into_inner()).into(),
        }))
    }
}

impl StderrDirectory {
    #[inline(always)]
    pub fn new(config: StderrSinkConfig) -> Self {
        Self {
            config,
            start: Instant::now(),
        }
    }
}

struct StderrSink {
    config: StderrSinkConfig,
    start: Instant,
    target: CompactString,
}

impl SinkBackend for StderrSink {
    #[inline(always)]
    fn enabled(&self, level: Level) -> bool {
        level <= self.config.level
    }

    fn write(&self, level: Level, message: &str) {
        let line = self.format(level, message);

        let mut stderr = stderr().lock();
        let _ = writeln!(stderr, "{line}");
        let _ = stderr.flush();
    }
}

impl StderrSink {
    fn format(&self, level: Level, message: &str) -> String {
        let mut result = String::with_capacity(message.len() + 32);

        let duration = self.start.elapsed();

        let mut seconds = duration.as_secs();
        let mut minutes = seconds / 60;
        let hours = minutes / 60;

        seconds -= minutes * 60;
        minutes -= hours * 60;

        result.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02} "));

        match self.config.colors {
            true => {
                let color = match level {
                    Level::Error => Color::Red,
                    Level::Warn => Color::Yellow,
                    Level::Info => Color::Green,
                    Level::Debug => Color::BrightBlue,
                    Level::Trace => Color::BrightBlack,
                };

                result.push_str(&self.target.apply(Style::new().bold().fg(color)));
            }

            false => result.push_str(&self.target),
        }

        if !message.is_empty() {
            if !message.starts_with('\n') {
                result.push(' ');
            }

            match self.config.colors {
                true => result.push_str(message),
                false => result.push_str(&message.sanitize()),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use log::{Level, LevelFilter};

    use crate::sink::{
        stderr::{StderrSink, StderrSinkConfig},
        SinkBackend,
    };

    #[test]
    fn test_stderr_format() {
        let sink = StderrSink {
            config: StderrSinkConfig {
                level: LevelFilter::Info,
                colors: false,
            },
            start: Instant::now(),
            target: "[Demo #1]".into(),
        };

        assert!(sink.enabled(Level::Warn));
        assert!(!sink.enabled(Level::Debug));

        assert_eq!(sink.format(Level::Info, "ready"), "00:00:00 [Demo #1] ready");
        assert_eq!(sink.format(Level::Info, ""), "00:00:00 [Demo #1]");
    }
}
