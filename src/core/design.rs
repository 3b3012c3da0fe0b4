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
use super::fileset::{FileSetRef, Files, DEFAULT_FILESET};
use super::filetype::FileTypeFilter;
use super::model::{DesignId, FileId, FileSetId, LibraryId, Model, ProjectId};
use super::project::check_directory;
use super::setting::Settings;
use super::version::{SystemRdlVersion, SystemVerilogVersion, VerilogVersion, VhdlVersion};
use crate::error::Error;
use crate::util::filesystem;
use crate::util::graphmap::GraphMap;
use indexmap::IndexMap;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::debug;

/// A named group of filesets and VHDL libraries within a project.
#[derive(Debug)]
pub struct Design {
    name: String,
    top_level: Option<String>,
    directory: PathBuf,
    pub(crate) project: Option<ProjectId>,
    pub(crate) filesets: IndexMap<String, FileSetId>,
    pub(crate) default_fileset: FileSetId,
    pub(crate) libraries: IndexMap<String, LibraryId>,
    external_libraries: Vec<String>,
    /// Edges point from a library to the libraries depending on it.
    pub(crate) library_graph: GraphMap<String, LibraryId, ()>,
    pub(crate) settings: Settings,
    pub(crate) attributes: AttributeBag,
}

impl Design {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn top_level(&self) -> Option<&str> {
        self.top_level.as_deref()
    }

    pub fn set_top_level(&mut self, top: Option<String>) {
        self.top_level = top;
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    pub fn set_directory(&mut self, dir: impl Into<PathBuf>) {
        self.directory = dir.into();
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Iterates over the top-level filesets in registration order.
    pub fn filesets(&self) -> impl Iterator<Item = FileSetId> + '_ {
        self.filesets.values().copied()
    }

    pub fn fileset_by_name(&self, name: &str) -> Option<FileSetId> {
        self.filesets.get(name).copied()
    }

    pub fn default_fileset(&self) -> FileSetId {
        self.default_fileset
    }

    /// Iterates over the design's VHDL libraries in registration order.
    pub fn libraries(&self) -> impl Iterator<Item = LibraryId> + '_ {
        self.libraries.values().copied()
    }

    pub fn library_by_name(&self, name: &str) -> Option<LibraryId> {
        self.libraries.get(name).copied()
    }

    /// Names of libraries the design uses without describing them.
    pub fn external_libraries(&self) -> &[String] {
        &self.external_libraries
    }

    pub fn add_external_library(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.external_libraries.contains(&name) == false {
            self.external_libraries.push(name);
        }
    }

    /// Number of registered top-level filesets.
    pub fn len(&self) -> usize {
        self.filesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filesets.is_empty()
    }
}

impl Display for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Names a design within a project.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignRef {
    Name(String),
    Id(DesignId),
}

impl From<&str> for DesignRef {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for DesignRef {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<DesignId> for DesignRef {
    fn from(value: DesignId) -> Self {
        Self::Id(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignBuilder {
    name: String,
    top_level: Option<String>,
    directory: PathBuf,
    project: Option<ProjectId>,
    settings: Settings,
}

impl DesignBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_level: None,
            directory: PathBuf::from("."),
            project: None,
            settings: Settings::new(),
        }
    }

    pub fn top_level(mut self, top: impl Into<String>) -> Self {
        self.top_level = Some(top.into());
        self
    }

    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = dir.into();
        self
    }

    pub fn project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
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
    /// Allocates a design and its default fileset without registering the
    /// design anywhere.
    pub(crate) fn alloc_design(&mut self, name: String, project: Option<ProjectId>) -> DesignId {
        let id = DesignId(self.designs.len());
        let fs = self.alloc_fileset(DEFAULT_FILESET.to_string(), Some(id), project);
        let mut filesets = IndexMap::new();
        filesets.insert(DEFAULT_FILESET.to_string(), fs);
        self.designs.push(Design {
            name,
            top_level: None,
            directory: PathBuf::from("."),
            project,
            filesets,
            default_fileset: fs,
            libraries: IndexMap::new(),
            external_libraries: Vec::new(),
            library_graph: GraphMap::new(),
            settings: Settings::new(),
            attributes: AttributeBag::new(),
        });
        id
    }

    /// Creates a design along with its default fileset (named `default`),
    /// registering it with its project when one is given.
    pub fn create_design(&mut self, builder: DesignBuilder) -> Result<DesignId, Error> {
        if let Some(p) = builder.project {
            let project = self.project(p);
            if project.design_by_name(&builder.name).is_some() {
                return Err(Error::DuplicateDesign(project.name().to_string(), builder.name));
            }
        }
        let id = self.alloc_design(builder.name, builder.project);
        {
            let d = &mut self.designs[id.0];
            d.top_level = builder.top_level;
            d.directory = builder.directory;
            d.settings = builder.settings;
        }
        if let Some(p) = builder.project {
            let name = self.design(id).name().to_string();
            self.projects[p.0].designs.insert(name, id);
        }
        debug!("created {}", self.describe(id));
        Ok(id)
    }

    /// Assigns `design` to `project` and registers it there.
    ///
    /// Once a design has a project it cannot be moved to another one.
    pub fn set_design_project(&mut self, design: DesignId, project: ProjectId) -> Result<(), Error> {
        let d = self.design(design);
        match d.project {
            Some(p) if p == project => return Ok(()),
            Some(p) => {
                return Err(Error::ProjectAlreadyAssigned(
                    d.name().to_string(),
                    self.project(p).name().to_string(),
                ))
            }
            None => (),
        }
        let p = self.project(project);
        if p.design_by_name(d.name()).is_some() {
            return Err(Error::DuplicateDesign(p.name().to_string(), d.name().to_string()));
        }
        let subtrees: Vec<FileSetId> = d.filesets().flat_map(|fs| self.subtree(fs)).collect();
        self.check_links(&subtrees, Some(design), Some(project))?;
        self.check_library_link(design.into(), Some(design), Some(project))?;
        for lib in d.libraries() {
            if let Some(have) = self.library(lib).project {
                if have != project {
                    return Err(self.project_mismatch(lib.into(), have, project));
                }
            }
        }

        let name = d.name().to_string();
        let libraries: Vec<LibraryId> = d.libraries().collect();
        self.designs[design.0].project = Some(project);
        self.projects[project.0].designs.insert(name, design);
        self.fill_links(&subtrees, Some(design), Some(project));
        for lib in libraries {
            self.libraries[lib.0].project.get_or_insert(project);
        }
        debug!("registered {} with {}", self.describe(design), self.describe(project));
        Ok(())
    }

    /// Registers `fileset` as a top-level fileset of `design`.
    pub fn design_add_fileset(&mut self, design: DesignId, fileset: FileSetId) -> Result<(), Error> {
        let d = self.design(design);
        let fs = self.fileset(fileset);
        if d.filesets().any(|f| f == fileset) {
            return Err(Error::FileSetAlreadyAdded(self.describe(design), fs.name().to_string()));
        }
        if d.filesets.contains_key(fs.name()) {
            return Err(Error::DuplicateFileSet(self.describe(design), fs.name().to_string()));
        }
        if let Some(parent) = fs.parent {
            return Err(Error::FileSetAlreadyOwned(fs.name().to_string(), self.describe(parent)));
        }
        if let Some(other) = fs.design {
            if other != design {
                return Err(Error::FileSetAlreadyOwned(fs.name().to_string(), self.describe(other)));
            }
        }
        let project = d.project;
        if let (Some(have), Some(want)) = (self.fileset_project(fileset), project) {
            if have != want {
                return Err(self.project_mismatch(fileset.into(), have, want));
            }
        }
        let subtree = self.subtree(fileset);
        self.check_links(&subtree, Some(design), project)?;

        let name = fs.name().to_string();
        self.designs[design.0].filesets.insert(name, fileset);
        self.filesets[fileset.0].design = Some(design);
        self.fill_links(&subtree, Some(design), project);
        debug!("added {} to {}", self.describe(fileset), self.describe(design));
        Ok(())
    }

    pub fn design_add_filesets(
        &mut self,
        design: DesignId,
        filesets: impl IntoIterator<Item = FileSetId>,
    ) -> Result<(), Error> {
        filesets
            .into_iter()
            .try_for_each(|fs| self.design_add_fileset(design, fs))
    }

    /// Looks up a top-level fileset registered with `design`.
    pub fn find_fileset(&self, design: DesignId, fileset: &FileSetRef) -> Result<FileSetId, Error> {
        let d = self.design(design);
        let found = match fileset {
            FileSetRef::Name(n) => d.fileset_by_name(n),
            FileSetRef::Id(id) => d.filesets().find(|f| f == id),
        };
        found.ok_or_else(|| Error::FileSetNotFound(self.name_of(fileset), self.describe(design)))
    }

    /// Designates one of the design's registered filesets as its default.
    pub fn set_default_fileset(&mut self, design: DesignId, fileset: impl Into<FileSetRef>) -> Result<(), Error> {
        let fs = self.find_fileset(design, &fileset.into())?;
        self.designs[design.0].default_fileset = fs;
        debug!("default fileset of {} is now {}", self.describe(design), self.describe(fs));
        Ok(())
    }

    /// Adds an unowned file to the design's default fileset.
    pub fn design_add_file(&mut self, design: DesignId, file: FileId) -> Result<(), Error> {
        let fs = self.design(design).default_fileset();
        self.fileset_add_file(fs, file)
    }

    pub fn design_add_files(&mut self, design: DesignId, files: impl IntoIterator<Item = FileId>) -> Result<(), Error> {
        files
            .into_iter()
            .try_for_each(|f| self.design_add_file(design, f))
    }

    /// Enumerates the files of every top-level fileset of `design` (or of the
    /// selected one) that match `filter`.
    pub fn design_files(
        &self,
        design: DesignId,
        filter: FileTypeFilter,
        fileset: Option<FileSetRef>,
    ) -> Result<Files<'_>, Error> {
        match fileset {
            None => Ok(Files::of_design(self, design, filter)),
            Some(r) => {
                let fs = self.find_fileset(design, &r)?;
                Ok(Files::of_fileset(self, fs, filter))
            }
        }
    }

    /// Computes the design's directory, relative to its project unless absolute.
    pub fn design_resolved_path(&self, design: DesignId) -> Result<PathBuf, Error> {
        let d = self.design(design);
        if d.directory.is_absolute() {
            return Ok(filesystem::normalize(&d.directory));
        }
        match d.project {
            Some(p) => Ok(filesystem::resolve_against(
                &self.project_resolved_path(p),
                &d.directory,
            )),
            None => Err(Error::PathUnresolved(self.describe(design))),
        }
    }

    /// Checks the design and then every one of its top-level filesets.
    pub fn validate_design(&self, design: DesignId) -> Result<(), Error> {
        let d = self.design(design);
        debug!("validating {}", self.describe(design));
        if d.name().is_empty() {
            return Err(Error::MissingName("design"));
        }
        if d.directory.as_os_str().is_empty() {
            return Err(Error::MissingPath(self.describe(design)));
        }
        let path = self
            .design_resolved_path(design)
            .map_err(|_| Error::ValidationPathUnresolved(self.describe(design)))?;
        check_directory(&path, || self.describe(design))?;
        if d.is_empty() {
            return Err(Error::NoFileSets(d.name().to_string()));
        }
        let default = self.fileset(d.default_fileset());
        if d.fileset_by_name(default.name()) != Some(d.default_fileset()) {
            return Err(Error::DefaultFileSetNotRegistered(d.name().to_string()));
        }
        if d.project.is_none() {
            return Err(Error::MissingLink(self.describe(design), "project"));
        }
        d.filesets().try_for_each(|fs| self.validate_fileset(fs))
    }
}
