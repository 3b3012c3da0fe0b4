//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! A metadata model for hardware design projects.
//!
//! A [Project] holds named [Design]s, each design holds a tree of
//! [FileSet]s, and filesets own [File]s. Language settings and attributes
//! cascade down that tree, so a value set on a project or design applies to
//! every file below it unless overridden closer to the file. VHDL files are
//! additionally grouped into [VhdlLibrary]s that cut across the fileset tree.
//!
//! Every entity lives in a [Model] and is addressed through a copyable handle.

pub mod core;
pub mod error;
pub mod util;

pub use crate::core::attribute::{Attribute, AttributeRegistry};
pub use crate::core::design::{Design, DesignBuilder};
pub use crate::core::file::{File, FileBuilder};
pub use crate::core::fileset::{FileSet, FileSetBuilder, SubFileSets};
pub use crate::core::filetype::{ContentType, FileKind, FileTypeFilter};
pub use crate::core::library::{LibraryBuilder, VhdlLibrary};
pub use crate::core::manifest::{Manifest, ManifestError};
pub use crate::core::model::{DesignId, EntityRef, FileId, FileSetId, LibraryId, Model, ProjectId};
pub use crate::core::project::{Project, ProjectBuilder};
pub use crate::core::setting::Setting;
pub use crate::error::Error;
