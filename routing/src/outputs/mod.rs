// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

mod hls;
mod webrtc;

pub use hls::*;
pub use webrtc::*;
