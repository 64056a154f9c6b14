/* This file is part of the YouTube Interaction Manager project
*
*  Copyright (C) 2025 YouTube Interaction Manager contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::{fmt::Display, sync::Arc};

use crate::lists::ListKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListErrorKind {
    AlreadyListed,
    NotListed,
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListError {
    pub list: ListKind,
    pub name: Arc<str>,
    pub kind: ListErrorKind,
}

impl std::error::Error for ListError {}
impl Display for ListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = self.list;
        match self.kind {
            ListErrorKind::AlreadyListed => write!(f, "Channel \"{}\" is already in the {list}", self.name),
            ListErrorKind::NotListed => write!(f, "Channel \"{}\" is not in the {list}", self.name),
            ListErrorKind::EmptyName => write!(f, "Refusing to add a channel without a name to the {list}"),
        }
    }
}
