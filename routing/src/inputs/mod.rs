// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

mod audio_signal;
mod browser;
mod rtmp;

pub use audio_signal::*;
pub use browser::*;
pub use rtmp::*;
