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

//! Cascading defaults (VHDL library and the language versions).
//!
//! Every entity stores its local overrides in a [Settings] record. Reading a
//! setting through `Model::setting` walks the resolution chain
//! `File -> FileSet -> parent FileSet ... -> Design -> Project` until a local
//! value is found.

use super::filetype::FileKind;
use super::model::LibraryId;
use super::version;
use std::fmt::Debug;

/// Local overrides stored on a single entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    vhdl_library: Option<LibraryId>,
    vhdl_version: Option<version::VhdlVersion>,
    verilog_version: Option<version::VerilogVersion>,
    sv_version: Option<version::SystemVerilogVersion>,
    srdl_version: Option<version::SystemRdlVersion>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vhdl_library(&self) -> Option<LibraryId> {
        self.vhdl_library
    }

    pub fn vhdl_version(&self) -> Option<version::VhdlVersion> {
        self.vhdl_version
    }

    pub fn verilog_version(&self) -> Option<version::VerilogVersion> {
        self.verilog_version
    }

    pub fn sv_version(&self) -> Option<version::SystemVerilogVersion> {
        self.sv_version
    }

    pub fn srdl_version(&self) -> Option<version::SystemRdlVersion> {
        self.srdl_version
    }

    pub fn with_vhdl_version(mut self, v: Option<version::VhdlVersion>) -> Self {
        self.vhdl_version = v;
        self
    }

    pub fn with_verilog_version(mut self, v: Option<version::VerilogVersion>) -> Self {
        self.verilog_version = v;
        self
    }

    pub fn with_sv_version(mut self, v: Option<version::SystemVerilogVersion>) -> Self {
        self.sv_version = v;
        self
    }

    pub fn with_srdl_version(mut self, v: Option<version::SystemRdlVersion>) -> Self {
        self.srdl_version = v;
        self
    }

    pub(crate) fn with_vhdl_library(mut self, lib: Option<LibraryId>) -> Self {
        self.vhdl_library = lib;
        self
    }

    /// Checks every stored override against the kind of entity holding them.
    ///
    /// Returns the name of the first setting that does not apply.
    pub(crate) fn first_inapplicable(&self, scope: Scope) -> Option<&'static str> {
        if self.vhdl_library.is_some() && VhdlLibrary::applies_to(scope) == false {
            Some(VhdlLibrary::NAME)
        } else if self.vhdl_version.is_some() && VhdlVersion::applies_to(scope) == false {
            Some(VhdlVersion::NAME)
        } else if self.verilog_version.is_some() && VerilogVersion::applies_to(scope) == false {
            Some(VerilogVersion::NAME)
        } else if self.sv_version.is_some() && SvVersion::applies_to(scope) == false {
            Some(SvVersion::NAME)
        } else if self.srdl_version.is_some() && SrdlVersion::applies_to(scope) == false {
            Some(SrdlVersion::NAME)
        } else {
            None
        }
    }
}

/// The kind of entity a setting is stored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Project,
    Design,
    FileSet,
    Library,
    File(FileKind),
}

/// A property that cascades down the containment hierarchy.
pub trait Setting {
    type Value: Copy + PartialEq + Debug;

    /// Human-readable name used in error messages.
    const NAME: &'static str;

    fn slot(settings: &Settings) -> &Option<Self::Value>;

    fn slot_mut(settings: &mut Settings) -> &mut Option<Self::Value>;

    /// Checks if an entity of kind `scope` can hold a local value.
    fn applies_to(scope: Scope) -> bool;
}

/// The VHDL library VHDL files are compiled into.
#[derive(Debug)]
pub enum VhdlLibrary {}

/// The VHDL language revision.
#[derive(Debug)]
pub enum VhdlVersion {}

/// The Verilog language revision.
#[derive(Debug)]
pub enum VerilogVersion {}

/// The SystemVerilog language revision.
#[derive(Debug)]
pub enum SvVersion {}

/// The SystemRDL language revision.
#[derive(Debug)]
pub enum SrdlVersion {}

impl Setting for VhdlLibrary {
    type Value = LibraryId;
    const NAME: &'static str = "VHDL library";

    fn slot(settings: &Settings) -> &Option<Self::Value> {
        &settings.vhdl_library
    }

    fn slot_mut(settings: &mut Settings) -> &mut Option<Self::Value> {
        &mut settings.vhdl_library
    }

    fn applies_to(scope: Scope) -> bool {
        match scope {
            Scope::Design | Scope::FileSet => true,
            Scope::File(kind) => kind.is_a(FileKind::VhdlSource),
            Scope::Project | Scope::Library => false,
        }
    }
}

impl Setting for VhdlVersion {
    type Value = version::VhdlVersion;
    const NAME: &'static str = "VHDL version";

    fn slot(settings: &Settings) -> &Option<Self::Value> {
        &settings.vhdl_version
    }

    fn slot_mut(settings: &mut Settings) -> &mut Option<Self::Value> {
        &mut settings.vhdl_version
    }

    fn applies_to(scope: Scope) -> bool {
        match scope {
            Scope::File(kind) => kind.is_a(FileKind::VhdlSource),
            _ => true,
        }
    }
}

impl Setting for VerilogVersion {
    type Value = version::VerilogVersion;
    const NAME: &'static str = "Verilog version";

    fn slot(settings: &Settings) -> &Option<Self::Value> {
        &settings.verilog_version
    }

    fn slot_mut(settings: &mut Settings) -> &mut Option<Self::Value> {
        &mut settings.verilog_version
    }

    fn applies_to(scope: Scope) -> bool {
        match scope {
            Scope::File(kind) => kind.is_a(FileKind::VerilogSource),
            Scope::Library => false,
            _ => true,
        }
    }
}

impl Setting for SvVersion {
    type Value = version::SystemVerilogVersion;
    const NAME: &'static str = "SystemVerilog version";

    fn slot(settings: &Settings) -> &Option<Self::Value> {
        &settings.sv_version
    }

    fn slot_mut(settings: &mut Settings) -> &mut Option<Self::Value> {
        &mut settings.sv_version
    }

    fn applies_to(scope: Scope) -> bool {
        match scope {
            Scope::File(kind) => kind.is_a(FileKind::SystemVerilogSource),
            Scope::Library => false,
            _ => true,
        }
    }
}

impl Setting for SrdlVersion {
    type Value = version::SystemRdlVersion;
    const NAME: &'static str = "SystemRDL version";

    fn slot(settings: &Settings) -> &Option<Self::Value> {
        &settings.srdl_version
    }

    fn slot_mut(settings: &mut Settings) -> &mut Option<Self::Value> {
        &mut settings.srdl_version
    }

    fn applies_to(scope: Scope) -> bool {
        match scope {
            Scope::File(kind) => kind.is_a(FileKind::SystemRdlSource),
            Scope::Library => false,
            _ => true,
        }
    }
}
