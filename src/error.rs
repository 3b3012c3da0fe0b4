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

use std::path::PathBuf;

/// Every way an operation on the project model can fail.
///
/// Entities are identified in messages by their kind and name (or path for
/// files), as produced by `Model::describe`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    // --- structural conflicts
    #[error("{0} already contains a fileset named {1:?}")]
    DuplicateFileSet(String, String),
    #[error("{0} already contains fileset {1:?}")]
    FileSetAlreadyAdded(String, String),
    #[error("fileset {0:?} is already bound to {1}")]
    FileSetAlreadyOwned(String, String),
    #[error("fileset {0:?} cannot be nested under itself or one of its sub-filesets")]
    FileSetCycle(String),
    #[error("project {0:?} already contains a design named {1:?}")]
    DuplicateDesign(String, String),
    #[error("a VHDL library named {1:?} already exists in design {0:?}")]
    DuplicateLibrary(String, String),
    #[error("VHDL library {1:?} was already added to design {0:?}")]
    LibraryAlreadyAdded(String, String),
    #[error("VHDL library {0:?} already belongs to design {1:?}")]
    LibraryAlreadyOwned(String, String),
    #[error("file {0:?} already belongs to fileset {1:?}")]
    FileAlreadyOwned(PathBuf, String),
    #[error("VHDL library {0:?} cannot depend on itself")]
    SelfDependency(String),
    #[error("VHDL libraries of design {0:?} form a dependency cycle through {1:?}")]
    LibraryCycle(String, Vec<String>),

    // --- unresolvable references
    #[error("{0} was neither set locally nor globally for {1}")]
    SettingUnresolved(&'static str, String),
    #[error("attribute {0:?} was neither set locally nor on any parent of {1}")]
    AttributeUnresolved(&'static str, String),
    #[error("cannot resolve the path of {0}: no fileset, design, or project to resolve against")]
    PathUnresolved(String),
    #[error("fileset {0:?} is not bound to {1}")]
    FileSetNotFound(String, String),
    #[error("design {0:?} is not bound to project {1:?}")]
    DesignNotFound(String, String),
    #[error("no VHDL library named {0:?} exists in {1}")]
    LibraryNotFound(String, String),
    #[error("{0} is not associated with a design")]
    MissingDesign(String),
    #[error("unknown file type {0:?}")]
    UnknownFileType(String),

    // --- type-contract violations
    #[error("{0:?} is not a declared attribute")]
    NotAnAttribute(String),
    #[error("attribute {0:?} expects a value of type {1}")]
    AttributeValueType(String, &'static str),
    #[error("attribute {0:?} is not set locally on {1}")]
    AttributeNotSet(&'static str, String),
    #[error("{0} does not apply to {1}")]
    SettingNotApplicable(&'static str, String),

    // --- filesystem inconsistencies (validation)
    #[error("validation: {0} has no name")]
    MissingName(&'static str),
    #[error("validation: {0} has no path")]
    MissingPath(String),
    #[error("validation: could not compute resolved path of {0}")]
    ValidationPathUnresolved(String),
    #[error("validation: {0} path {1:?} does not exist")]
    PathNotFound(String, PathBuf),
    #[error("validation: {0} path {1:?} is not a directory")]
    NotADirectory(String, PathBuf),
    #[error("validation: {0} path {1:?} is not a file")]
    NotAFile(String, PathBuf),
    #[error("validation: {0} has no {1}")]
    MissingLink(String, &'static str),
    #[error("validation: design {0:?} has no fileset")]
    NoFileSets(String),
    #[error("validation: project {0:?} has no design")]
    NoDesigns(String),
    #[error("validation: design {0:?}'s default fileset is not in its list of filesets")]
    DefaultFileSetNotRegistered(String),
    #[error("validation: project {0:?}'s default design is not in its list of designs")]
    DefaultDesignNotRegistered(String),

    // --- cross-reference mismatches
    #[error("{0} is assigned to project {1:?} but was linked to project {2:?}")]
    ProjectMismatch(String, String, String),
    #[error("{0} is assigned to design {1:?} but was linked to design {2:?}")]
    DesignMismatch(String, String, String),
    #[error("design {0:?} already belongs to project {1:?}")]
    ProjectAlreadyAssigned(String, String),
}

impl Error {
    /// Checks if the error was raised by a `validate_*` operation.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::MissingName(_)
            | Self::MissingPath(_)
            | Self::ValidationPathUnresolved(_)
            | Self::PathNotFound(_, _)
            | Self::NotADirectory(_, _)
            | Self::NotAFile(_, _)
            | Self::MissingLink(_, _)
            | Self::NoFileSets(_)
            | Self::NoDesigns(_)
            | Self::DefaultFileSetNotRegistered(_)
            | Self::DefaultDesignNotRegistered(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::FileAlreadyOwned(PathBuf::from("a.vhdl"), String::from("rtl")).to_string(),
            "file \"a.vhdl\" already belongs to fileset \"rtl\""
        );
        assert_eq!(
            Error::SettingUnresolved("VHDL version", String::from("fileset \"sim\"")).to_string(),
            "VHDL version was neither set locally nor globally for fileset \"sim\""
        );
        assert_eq!(
            Error::MissingLink(String::from("file \"a.vhdl\""), "design").to_string(),
            "validation: file \"a.vhdl\" has no design"
        );
    }

    #[test]
    fn validation_kinds() {
        assert_eq!(Error::NoDesigns(String::from("p")).is_validation(), true);
        assert_eq!(Error::NotAnAttribute(String::from("x")).is_validation(), false);
    }
}
