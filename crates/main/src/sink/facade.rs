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
use log::{log, log_enabled, Level};

use crate::{
    model::ScriptId,
    sink::{Sink, SinkBackend, SinkDirectory},
};

/// The [log] target of the records written through the [LogDirectory] sinks.
pub static SCRIPT_LOG: &'static str = "stagehand::script";

/// A [SinkDirectory] that forwards the records of every script to the [log]
/// facade under the [SCRIPT_LOG] target.
///
/// Each message is prefixed with the script's name and identifier. Whether
/// a record is accepted is decided by the installed logger.
#[derive(Clone, Copy, Default, Debug)]
pub struct LogDirectory;

impl SinkDirectory for LogDirectory {
    #[inline]
    fn create_sink(&self, id: ScriptId, name: &str) -> Option<Sink> {
        Some(Sink::new(LogSink {
            id,
            name: CompactString::from(name),
        }))
    }
}

struct LogSink {
    id: ScriptId,
    name: CompactString,
}

impl SinkBackend for LogSink {
    #[inline(always)]
    fn enabled(&self, level: Level) -> bool {
        log_enabled!(target: SCRIPT_LOG, level)
    }

    fn write(&self, level: Level, message: &str) {
        let name = &self.name;
        let id = self.id.into_inner();

        log!(target: SCRIPT_LOG, level, "[{name} #{id}] {message}");
    }
}
