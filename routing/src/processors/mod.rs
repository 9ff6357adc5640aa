// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

mod compose;
mod ladder;

pub use compose::*;
pub use ladder::*;
