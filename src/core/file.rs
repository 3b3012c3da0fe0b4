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

use super::attribute::AttributeBag;
use super::filetype::FileKind;
use super::model::{DesignId, FileId, FileSetId, LibraryId, Model, ProjectId};
use super::setting::{self, Scope, Setting, Settings};
use super::version::{SystemRdlVersion, SystemVerilogVersion, VerilogVersion, VhdlVersion};
use crate::error::Error;
use crate::util::filesystem;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single path-addressed artifact of a design.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
    kind: FileKind,
    pub(crate) project: Option<ProjectId>,
    pub(crate) design: Option<DesignId>,
    pub(crate) fileset: Option<FileSetId>,
    pub(crate) settings: Settings,
    pub(crate) attributes: AttributeBag,
}

impl File {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    pub fn design(&self) -> Option<DesignId> {
        self.design
    }

    pub fn fileset(&self) -> Option<FileSetId> {
        self.fileset
    }
}

impl Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A VHDL library given either by name (looked up in a design) or by handle.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryRef {
    Name(String),
    Id(LibraryId),
}

impl From<&str> for LibraryRef {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for LibraryRef {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<LibraryId> for LibraryRef {
    fn from(value: LibraryId) -> Self {
        Self::Id(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileBuilder {
    path: PathBuf,
    kind: Option<FileKind>,
    project: Option<ProjectId>,
    design: Option<DesignId>,
    fileset: Option<FileSetId>,
    vhdl_library: Option<LibraryRef>,
    settings: Settings,
}

impl FileBuilder {
    /// Starts a file at `path`. Its kind is detected from the extension unless
    /// [FileBuilder::kind] is given.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: None,
            project: None,
            design: None,
            fileset: None,
            vhdl_library: None,
            settings: Settings::new(),
        }
    }

    pub fn kind(mut self, kind: FileKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    pub fn design(mut self, design: DesignId) -> Self {
        self.design = Some(design);
        self
    }

    pub fn fileset(mut self, fileset: FileSetId) -> Self {
        self.fileset = Some(fileset);
        self
    }

    pub fn vhdl_library(mut self, lib: impl Into<LibraryRef>) -> Self {
        self.vhdl_library = Some(lib.into());
        self
    }

    pub fn vhdl_version(mut self, v: VhdlVersion) -> Self {
        self.settings = self.settings.with_vhdl_version(Some(v));
        self
    }

    pub fn verilog_version(mut self, v: VerilogVersion) -> Self {
        self.settings = self.settings.with_verilog_version(Some(v));
        self
    }

    pub fn sv_version(mut self, v: SystemVerilogVersion) -> Self {
        self.settings = self.settings.with_sv_version(Some(v));
        self
    }

    pub fn srdl_version(mut self, v: SystemRdlVersion) -> Self {
        self.settings = self.settings.with_srdl_version(Some(v));
        self
    }
}

impl Model {
    /// Creates a file and links it into the most specific container given:
    /// the fileset, else the design's default fileset, else the default
    /// fileset of the project's default design. A file given none of them is
    /// left detached.
    ///
    /// A VHDL library given by name must already exist in the design the file
    /// lands in.
    pub fn create_file(&mut self, builder: FileBuilder) -> Result<FileId, Error> {
        let kind = builder.kind.unwrap_or_else(|| FileKind::detect(&builder.path));
        let describe = || format!("file {:?}", builder.path);
        if let Some(name) = builder.settings.first_inapplicable(Scope::File(kind)) {
            return Err(Error::SettingNotApplicable(name, describe()));
        }
        let library = match &builder.vhdl_library {
            None => None,
            Some(_) if setting::VhdlLibrary::applies_to(Scope::File(kind)) == false => {
                return Err(Error::SettingNotApplicable(setting::VhdlLibrary::NAME, describe()))
            }
            Some(LibraryRef::Id(lib)) => Some(*lib),
            Some(LibraryRef::Name(name)) => {
                let design = match (builder.fileset, builder.design, builder.project) {
                    (Some(fs), _, _) => self.fileset_design(fs),
                    (None, Some(d), _) => Some(d),
                    (None, None, Some(p)) => Some(self.project(p).default_design()),
                    (None, None, None) => None,
                };
                let design = design.ok_or_else(|| Error::MissingDesign(describe()))?;
                match self.design(design).library_by_name(name) {
                    Some(lib) => Some(lib),
                    None => return Err(Error::LibraryNotFound(name.clone(), self.describe(design))),
                }
            }
        };

        let id = FileId(self.files.len());
        self.files.push(File {
            path: builder.path,
            kind,
            project: builder.project,
            design: builder.design,
            fileset: None,
            settings: builder.settings.with_vhdl_library(library),
            attributes: AttributeBag::new(),
        });
        let design = match (builder.fileset, builder.design, builder.project) {
            (Some(fs), _, _) => self.fileset_design(fs).or(builder.design),
            (None, Some(d), _) => Some(d),
            (None, None, Some(p)) => Some(self.project(p).default_design()),
            (None, None, None) => None,
        };
        let project = builder
            .project
            .or_else(|| builder.fileset.and_then(|fs| self.fileset_project(fs)))
            .or_else(|| design.and_then(|d| self.design(d).project));
        if let Err(e) = self.check_library_link(id.into(), design, project) {
            self.files.pop();
            return Err(e);
        }
        let linked = match (builder.fileset, builder.design, builder.project) {
            (Some(fs), _, _) => self.fileset_add_file(fs, id),
            (None, Some(d), _) => self.design_add_file(d, id),
            (None, None, Some(p)) => {
                let d = self.project(p).default_design();
                self.design_add_file(d, id)
            }
            (None, None, None) => Ok(()),
        };
        if let Err(e) = linked {
            self.files.pop();
            return Err(e);
        }
        if let Some(lib) = library {
            self.libraries[lib.0].files.push(id);
        }
        debug!("created {} as {}", self.describe(id), kind);
        Ok(id)
    }

    /// Assigns `project` to `file`.
    ///
    /// A file without a fileset is added to the default fileset of the
    /// project's default design.
    pub fn set_file_project(&mut self, file: FileId, project: ProjectId) -> Result<(), Error> {
        let (current, fileset) = (self.file(file).project, self.file(file).fileset);
        if let Some(have) = current {
            if have != project {
                return Err(self.project_mismatch(file.into(), have, project));
            }
        }
        self.check_library_link(file.into(), None, Some(project))?;
        match fileset {
            None => {
                let d = self.project(project).default_design();
                self.design_add_file(d, file)?;
            }
            Some(fs) => {
                if let Some(have) = self.fileset_project(fs) {
                    if have != project {
                        return Err(self.project_mismatch(file.into(), have, project));
                    }
                }
            }
        }
        self.files[file.0].project = Some(project);
        Ok(())
    }

    /// Assigns `design` to `file`.
    ///
    /// A file without a fileset is added to the design's default fileset.
    pub fn set_file_design(&mut self, file: FileId, design: DesignId) -> Result<(), Error> {
        let f = self.file(file);
        let fileset = f.fileset;
        if let Some(have) = f.design {
            if have != design {
                return Err(self.design_mismatch(file.into(), have, design));
            }
        }
        if let (Some(have), Some(want)) = (f.project, self.design(design).project) {
            if have != want {
                return Err(self.project_mismatch(file.into(), have, want));
            }
        }
        self.check_library_link(file.into(), Some(design), self.design(design).project.or(f.project))?;
        match fileset {
            None => self.design_add_file(design, file)?,
            Some(fs) => {
                if let Some(have) = self.fileset_design(fs) {
                    if have != design {
                        return Err(self.design_mismatch(file.into(), have, design));
                    }
                }
            }
        }
        let project = self.design(design).project;
        let f = &mut self.files[file.0];
        f.design = Some(design);
        if f.project.is_none() {
            f.project = project;
        }
        Ok(())
    }

    /// Adds `file` to `fileset`, see [Model::fileset_add_file].
    pub fn set_file_fileset(&mut self, file: FileId, fileset: FileSetId) -> Result<(), Error> {
        self.fileset_add_file(fileset, file)
    }

    /// Assigns a VHDL library to a VHDL file, moving the file's membership.
    ///
    /// A library given by name is looked up in the file's design.
    pub fn set_file_vhdl_library(&mut self, file: FileId, library: impl Into<LibraryRef>) -> Result<(), Error> {
        let lib = match library.into() {
            LibraryRef::Id(id) => id,
            LibraryRef::Name(name) => {
                let f = self.file(file);
                let design = f
                    .design
                    .or_else(|| f.fileset.and_then(|fs| self.fileset_design(fs)))
                    .ok_or_else(|| Error::MissingDesign(self.describe(file)))?;
                self.design(design)
                    .library_by_name(&name)
                    .ok_or_else(|| Error::LibraryNotFound(name, self.describe(design)))?
            }
        };
        self.set_setting::<setting::VhdlLibrary>(file, Some(lib))?;
        Ok(())
    }

    /// Computes the file's path: an absolute path is used as is, a relative
    /// one is joined onto its fileset's directory.
    pub fn file_resolved_path(&self, file: FileId) -> Result<PathBuf, Error> {
        let f = self.file(file);
        if f.path.is_absolute() {
            Ok(filesystem::normalize(&f.path))
        } else if let Some(fs) = f.fileset {
            Ok(filesystem::resolve_against(&self.fileset_resolved_path(fs)?, &f.path))
        } else {
            Err(Error::PathUnresolved(self.describe(file)))
        }
    }

    /// Checks the file exists on disk and is fully linked into the hierarchy.
    ///
    /// VHDL files must also resolve a VHDL library and version.
    pub fn validate_file(&self, file: FileId) -> Result<(), Error> {
        let f = self.file(file);
        debug!("validating {}", self.describe(file));
        if f.path.as_os_str().is_empty() {
            return Err(Error::MissingPath(self.describe(file)));
        }
        let path = self
            .file_resolved_path(file)
            .map_err(|_| Error::ValidationPathUnresolved(self.describe(file)))?;
        if path.exists() == false {
            return Err(Error::PathNotFound(self.describe(file), path));
        }
        if path.is_file() == false {
            return Err(Error::NotAFile(self.describe(file), path));
        }
        if f.fileset.is_none() {
            return Err(Error::MissingLink(self.describe(file), "fileset"));
        }
        if f.design.is_none() {
            return Err(Error::MissingLink(self.describe(file), "design"));
        }
        if f.project.is_none() {
            return Err(Error::MissingLink(self.describe(file), "project"));
        }
        if f.kind.is_a(FileKind::VhdlSource) {
            if self.setting::<setting::VhdlLibrary>(file).is_err() {
                return Err(Error::MissingLink(self.describe(file), setting::VhdlLibrary::NAME));
            }
            if self.setting::<setting::VhdlVersion>(file).is_err() {
                return Err(Error::MissingLink(self.describe(file), setting::VhdlVersion::NAME));
            }
        }
        Ok(())
    }
}
