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

//! Filesets: ordered, nestable collections of files.
//!
//! A fileset is the main scope for VHDL library and language version defaults.
//! Enumerating a fileset visits every sub-fileset (in the order they were
//! added) before the fileset's own files.

use super::attribute::AttributeBag;
use super::filetype::FileTypeFilter;
use super::library::LibraryBuilder;
use super::model::{DesignId, FileId, FileSetId, LibraryId, Model, ProjectId};
use super::project::check_directory;
use super::setting::Settings;
use super::version::{SystemRdlVersion, SystemVerilogVersion, VerilogVersion, VhdlVersion};
use crate::error::Error;
use crate::util::filesystem;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_FILESET: &str = "default";

#[derive(Debug)]
pub struct FileSet {
    name: String,
    top_level: Option<String>,
    directory: PathBuf,
    pub(crate) project: Option<ProjectId>,
    pub(crate) design: Option<DesignId>,
    pub(crate) parent: Option<FileSetId>,
    pub(crate) children: IndexMap<String, FileSetId>,
    pub(crate) files: Vec<FileId>,
    pub(crate) library_cache: HashMap<String, LibraryId>,
    pub(crate) settings: Settings,
    pub(crate) attributes: AttributeBag,
}

impl FileSet {
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

    /// The project assigned directly to this fileset (see `Model::fileset_project`).
    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// The design assigned directly to this fileset (see `Model::fileset_design`).
    pub fn design(&self) -> Option<DesignId> {
        self.design
    }

    pub fn parent(&self) -> Option<FileSetId> {
        self.parent
    }

    /// Iterates over the direct sub-filesets in the order they were added.
    pub fn filesets(&self) -> impl Iterator<Item = FileSetId> + '_ {
        self.children.values().copied()
    }

    pub fn fileset_by_name(&self, name: &str) -> Option<FileSetId> {
        self.children.get(name).copied()
    }

    /// The files owned directly by this fileset, in insertion order.
    pub fn own_files(&self) -> &[FileId] {
        &self.files
    }
}

impl Display for FileSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Names a fileset within a container.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSetRef {
    Name(String),
    Id(FileSetId),
}

impl From<&str> for FileSetRef {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for FileSetRef {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<FileSetId> for FileSetRef {
    fn from(value: FileSetId) -> Self {
        Self::Id(value)
    }
}

/// Chooses how sub-filesets take part in enumerating a fileset's files.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubFileSets {
    /// Every sub-fileset (recursively), then the fileset's own files.
    #[default]
    All,
    /// Only the fileset's own files.
    Exclude,
    /// Only the files of the named direct sub-fileset (recursively).
    Only(FileSetRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileSetBuilder {
    name: String,
    top_level: Option<String>,
    directory: PathBuf,
    project: Option<ProjectId>,
    design: Option<DesignId>,
    parent: Option<FileSetId>,
    settings: Settings,
}

impl FileSetBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_level: None,
            directory: PathBuf::from("."),
            project: None,
            design: None,
            parent: None,
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

    pub fn design(mut self, design: DesignId) -> Self {
        self.design = Some(design);
        self
    }

    pub fn parent(mut self, parent: FileSetId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn vhdl_library(mut self, lib: LibraryId) -> Self {
        self.settings = self.settings.with_vhdl_library(Some(lib));
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

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Walking the top-level filesets of a design.
    Design(DesignId, usize),
    /// Walking the sub-filesets of a fileset.
    Children(FileSetId, usize),
    /// Walking the files owned by a fileset.
    Own(FileSetId, usize),
}

enum Step {
    Enter(FileSetId),
    Own(FileSetId),
    Yield(FileId),
    Pop,
}

/// A lazy, depth-first enumeration of files.
///
/// The model cannot be mutated while the enumeration is alive.
#[derive(Debug, Clone)]
pub struct Files<'a> {
    model: &'a Model,
    filter: FileTypeFilter,
    stack: Vec<Frame>,
}

impl<'a> Files<'a> {
    pub(crate) fn of_design(model: &'a Model, design: DesignId, filter: FileTypeFilter) -> Self {
        Self {
            model,
            filter,
            stack: vec![Frame::Design(design, 0)],
        }
    }

    pub(crate) fn of_fileset(model: &'a Model, fileset: FileSetId, filter: FileTypeFilter) -> Self {
        Self {
            model,
            filter,
            stack: vec![Frame::Children(fileset, 0)],
        }
    }

    fn own_only(model: &'a Model, fileset: FileSetId, filter: FileTypeFilter) -> Self {
        Self {
            model,
            filter,
            stack: vec![Frame::Own(fileset, 0)],
        }
    }
}

impl<'a> Iterator for Files<'a> {
    type Item = FileId;

    fn next(&mut self) -> Option<Self::Item> {
        let model = self.model;
        loop {
            let step = match self.stack.last_mut()? {
                Frame::Design(d, i) => {
                    let next = model.design(*d).filesets.get_index(*i).map(|(_, fs)| *fs);
                    *i += 1;
                    match next {
                        Some(fs) => Step::Enter(fs),
                        None => Step::Pop,
                    }
                }
                Frame::Children(fs, i) => {
                    let next = model.fileset(*fs).children.get_index(*i).map(|(_, c)| *c);
                    *i += 1;
                    match next {
                        Some(c) => Step::Enter(c),
                        None => Step::Own(*fs),
                    }
                }
                Frame::Own(fs, i) => {
                    let next = model.fileset(*fs).files.get(*i).copied();
                    *i += 1;
                    match next {
                        Some(f) => Step::Yield(f),
                        None => Step::Pop,
                    }
                }
            };
            match step {
                Step::Enter(fs) => self.stack.push(Frame::Children(fs, 0)),
                Step::Own(fs) => {
                    if let Some(top) = self.stack.last_mut() {
                        *top = Frame::Own(fs, 0);
                    }
                }
                Step::Yield(f) => {
                    if self.filter.matches(model.file(f).kind()) {
                        return Some(f);
                    }
                }
                Step::Pop => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl Model {
    pub(crate) fn alloc_fileset(&mut self, name: String, design: Option<DesignId>, project: Option<ProjectId>) -> FileSetId {
        let id = FileSetId(self.filesets.len());
        self.filesets.push(FileSet {
            name,
            top_level: None,
            directory: PathBuf::from("."),
            project,
            design,
            parent: None,
            children: IndexMap::new(),
            files: Vec::new(),
            library_cache: HashMap::new(),
            settings: Settings::new(),
            attributes: AttributeBag::new(),
        });
        id
    }

    /// Creates a fileset, linking it under its parent fileset when one is
    /// given, else registering it with its design.
    ///
    /// A fileset given only a project stays unregistered.
    pub fn create_fileset(&mut self, builder: FileSetBuilder) -> Result<FileSetId, Error> {
        let project = builder.project.or_else(|| builder.design.and_then(|d| self.design(d).project));
        let id = self.alloc_fileset(builder.name, builder.design, project);
        {
            let fs = &mut self.filesets[id.0];
            fs.top_level = builder.top_level;
            fs.directory = builder.directory;
            fs.settings = builder.settings;
        }
        let linked = match (builder.parent, builder.design) {
            (Some(parent), _) => self.fileset_add_fileset(parent, id),
            (None, Some(design)) => self.design_add_fileset(design, id),
            (None, None) => self.check_library_link(id.into(), None, project),
        };
        match linked {
            Ok(()) => {
                debug!("created {}", self.describe(id));
                Ok(id)
            }
            Err(e) => {
                self.filesets.pop();
                Err(e)
            }
        }
    }

    /// The design of `fileset`, inherited from its parent filesets when not
    /// assigned directly.
    pub fn fileset_design(&self, fileset: FileSetId) -> Option<DesignId> {
        let fs = self.fileset(fileset);
        fs.design
            .or_else(|| fs.parent.and_then(|p| self.fileset_design(p)))
    }

    /// The project of `fileset`, inherited from its design or parent filesets
    /// when not assigned directly.
    pub fn fileset_project(&self, fileset: FileSetId) -> Option<ProjectId> {
        let fs = self.fileset(fileset);
        fs.project
            .or_else(|| fs.design.and_then(|d| self.design(d).project))
            .or_else(|| fs.parent.and_then(|p| self.fileset_project(p)))
    }

    /// Lists `fileset` and every fileset nested below it (pre-order).
    pub(crate) fn subtree(&self, fileset: FileSetId) -> Vec<FileSetId> {
        let mut result = Vec::new();
        let mut stack = vec![fileset];
        while let Some(fs) = stack.pop() {
            result.push(fs);
            stack.extend(self.fileset(fs).filesets().collect::<Vec<_>>().into_iter().rev());
        }
        result
    }

    /// Checks the filesets and files of `subtrees` against the design and
    /// project they are about to be linked to.
    pub(crate) fn check_links(
        &self,
        subtrees: &[FileSetId],
        design: Option<DesignId>,
        project: Option<ProjectId>,
    ) -> Result<(), Error> {
        for &fs in subtrees {
            let set = self.fileset(fs);
            if let (Some(have), Some(want)) = (set.design, design) {
                if have != want {
                    return Err(self.design_mismatch(fs.into(), have, want));
                }
            }
            if let (Some(have), Some(want)) = (set.project, project) {
                if have != want {
                    return Err(self.project_mismatch(fs.into(), have, want));
                }
            }
            for &file in set.own_files() {
                let f = self.file(file);
                if let (Some(have), Some(want)) = (f.design, design) {
                    if have != want {
                        return Err(self.design_mismatch(file.into(), have, want));
                    }
                }
                if let (Some(have), Some(want)) = (f.project, project) {
                    if have != want {
                        return Err(self.project_mismatch(file.into(), have, want));
                    }
                }
                self.check_library_link(file.into(), design.or(f.design), project.or(f.project))?;
            }
            self.check_library_link(fs.into(), design.or(set.design), project.or(set.project))?;
        }
        Ok(())
    }

    /// Fills in the missing design and project back-references of the files in
    /// `subtrees`, and the missing project of the filesets.
    pub(crate) fn fill_links(&mut self, subtrees: &[FileSetId], design: Option<DesignId>, project: Option<ProjectId>) {
        for &fs in subtrees {
            if self.filesets[fs.0].project.is_none() {
                self.filesets[fs.0].project = project;
            }
            for i in 0..self.filesets[fs.0].files.len() {
                let file = self.filesets[fs.0].files[i];
                let f = &mut self.files[file.0];
                if f.design.is_none() {
                    f.design = design;
                }
                if f.project.is_none() {
                    f.project = project;
                }
            }
        }
    }

    /// Nests `child` under `parent`.
    ///
    /// Setting the child's parent is the same operation, see
    /// [Model::set_fileset_parent].
    pub fn fileset_add_fileset(&mut self, parent: FileSetId, child: FileSetId) -> Result<(), Error> {
        let p = self.fileset(parent);
        let c = self.fileset(child);
        if p.filesets().any(|f| f == child) {
            return Err(Error::FileSetAlreadyAdded(self.describe(parent), c.name().to_string()));
        }
        if p.children.contains_key(c.name()) {
            return Err(Error::DuplicateFileSet(self.describe(parent), c.name().to_string()));
        }
        // the parent may not be the child or sit below it
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return Err(Error::FileSetCycle(c.name().to_string()));
            }
            ancestor = self.fileset(a).parent;
        }
        if let Some(owner) = c.parent {
            return Err(Error::FileSetAlreadyOwned(c.name().to_string(), self.describe(owner)));
        }
        if let Some(d) = c.design {
            if self.design(d).filesets().any(|f| f == child) {
                return Err(Error::FileSetAlreadyOwned(c.name().to_string(), self.describe(d)));
            }
        }
        let design = self.fileset_design(parent);
        let project = self.fileset_project(parent);
        let subtree = self.subtree(child);
        self.check_links(&subtree, design, project)?;
        if let (Some(have), Some(want)) = (self.fileset_project(child), project) {
            if have != want {
                return Err(self.project_mismatch(child.into(), have, want));
            }
        }

        let name = self.fileset(child).name().to_string();
        self.filesets[parent.0].children.insert(name, child);
        self.filesets[child.0].parent = Some(parent);
        self.fill_links(&subtree, design, project);
        debug!("nested {} under {}", self.describe(child), self.describe(parent));
        Ok(())
    }

    pub fn fileset_add_filesets(
        &mut self,
        parent: FileSetId,
        children: impl IntoIterator<Item = FileSetId>,
    ) -> Result<(), Error> {
        children
            .into_iter()
            .try_for_each(|c| self.fileset_add_fileset(parent, c))
    }

    pub fn set_fileset_parent(&mut self, fileset: FileSetId, parent: FileSetId) -> Result<(), Error> {
        self.fileset_add_fileset(parent, fileset)
    }

    /// Assigns `design` to `fileset`.
    ///
    /// A top-level fileset gets registered with the design. A nested fileset
    /// must agree with the design inherited from its parent.
    pub fn set_fileset_design(&mut self, fileset: FileSetId, design: DesignId) -> Result<(), Error> {
        let fs = self.fileset(fileset);
        match fs.parent {
            None => {
                if fs.design == Some(design) && self.design(design).filesets().any(|f| f == fileset) {
                    return Ok(());
                }
                self.design_add_fileset(design, fileset)
            }
            Some(parent) => {
                if let Some(have) = self.fileset_design(parent) {
                    if have != design {
                        return Err(self.design_mismatch(fileset.into(), have, design));
                    }
                }
                let project = self.design(design).project;
                let subtree = self.subtree(fileset);
                self.check_links(&subtree, Some(design), project)?;
                self.filesets[fileset.0].design = Some(design);
                self.fill_links(&subtree, Some(design), project);
                Ok(())
            }
        }
    }

    /// Assigns `project` to `fileset`, which must agree with any project it
    /// already has.
    pub fn set_fileset_project(&mut self, fileset: FileSetId, project: ProjectId) -> Result<(), Error> {
        if let Some(have) = self.fileset_project(fileset) {
            if have != project {
                return Err(self.project_mismatch(fileset.into(), have, project));
            }
        }
        let subtree = self.subtree(fileset);
        self.check_links(&subtree, None, Some(project))?;
        self.filesets[fileset.0].project = Some(project);
        Ok(())
    }

    /// Appends `file` to the files of `fileset`.
    ///
    /// A file belongs to at most one fileset, so adding a file that is already
    /// owned (by any fileset, this one included) is an error.
    pub fn fileset_add_file(&mut self, fileset: FileSetId, file: FileId) -> Result<(), Error> {
        let f = self.file(file);
        if let Some(owner) = f.fileset {
            return Err(Error::FileAlreadyOwned(
                f.path().to_path_buf(),
                self.fileset(owner).name().to_string(),
            ));
        }
        let design = self.fileset_design(fileset);
        let project = self.fileset_project(fileset);
        if let (Some(have), Some(want)) = (f.design, design) {
            if have != want {
                return Err(self.design_mismatch(file.into(), have, want));
            }
        }
        if let (Some(have), Some(want)) = (f.project, project) {
            if have != want {
                return Err(self.project_mismatch(file.into(), have, want));
            }
        }
        self.check_library_link(file.into(), design.or(f.design), project.or(f.project))?;

        self.filesets[fileset.0].files.push(file);
        let f = &mut self.files[file.0];
        f.fileset = Some(fileset);
        if f.design.is_none() {
            f.design = design;
        }
        if f.project.is_none() {
            f.project = project;
        }
        debug!("added {} to {}", self.describe(file), self.describe(fileset));
        Ok(())
    }

    pub fn fileset_add_files(&mut self, fileset: FileSetId, files: impl IntoIterator<Item = FileId>) -> Result<(), Error> {
        files
            .into_iter()
            .try_for_each(|f| self.fileset_add_file(fileset, f))
    }

    /// Enumerates the files of `fileset` that match `filter`.
    pub fn fileset_files(
        &self,
        fileset: FileSetId,
        filter: FileTypeFilter,
        sub: SubFileSets,
    ) -> Result<Files<'_>, Error> {
        Ok(match sub {
            SubFileSets::All => Files::of_fileset(self, fileset, filter),
            SubFileSets::Exclude => Files::own_only(self, fileset, filter),
            SubFileSets::Only(child) => {
                let fs = self.fileset(fileset);
                let found = match &child {
                    FileSetRef::Name(n) => fs.fileset_by_name(n),
                    FileSetRef::Id(id) => fs.filesets().find(|c| c == id),
                };
                match found {
                    Some(c) => Files::of_fileset(self, c, filter),
                    None => return Err(Error::FileSetNotFound(self.name_of(&child), self.describe(fileset))),
                }
            }
        })
    }

    pub(crate) fn name_of(&self, fs: &FileSetRef) -> String {
        match fs {
            FileSetRef::Name(n) => n.clone(),
            FileSetRef::Id(id) => self.fileset(*id).name().to_string(),
        }
    }

    /// Number of files in `fileset`, including those of every sub-fileset.
    pub fn fileset_len(&self, fileset: FileSetId) -> usize {
        let fs = self.fileset(fileset);
        fs.files.len() + fs.filesets().map(|c| self.fileset_len(c)).sum::<usize>()
    }

    /// Computes the directory of `fileset` by walking up through its parent
    /// fileset, design, or project.
    pub fn fileset_resolved_path(&self, fileset: FileSetId) -> Result<PathBuf, Error> {
        let fs = self.fileset(fileset);
        if fs.directory.is_absolute() {
            return Ok(filesystem::normalize(&fs.directory));
        }
        let base = if let Some(p) = fs.parent {
            self.fileset_resolved_path(p)?
        } else if let Some(d) = fs.design {
            self.design_resolved_path(d)?
        } else if let Some(p) = fs.project {
            self.project_resolved_path(p)
        } else {
            return Err(Error::PathUnresolved(self.describe(fileset)));
        };
        Ok(filesystem::resolve_against(&base, &fs.directory))
    }

    /// Returns the VHDL library `name` of the fileset's design, creating it
    /// (with the fileset's local VHDL version) when the design has none yet.
    pub fn get_or_create_vhdl_library(&mut self, fileset: FileSetId, name: &str) -> Result<LibraryId, Error> {
        if let Some(lib) = self.fileset(fileset).library_cache.get(name) {
            return Ok(*lib);
        }
        let design = self
            .fileset_design(fileset)
            .ok_or_else(|| Error::MissingDesign(self.describe(fileset)))?;
        let lib = match self.design(design).library_by_name(name) {
            Some(lib) => lib,
            None => {
                let mut builder = LibraryBuilder::new(name).design(design);
                if let Some(v) = self.fileset(fileset).settings.vhdl_version() {
                    builder = builder.vhdl_version(v);
                }
                self.create_vhdl_library(builder)?
            }
        };
        self.filesets[fileset.0]
            .library_cache
            .insert(name.to_string(), lib);
        Ok(lib)
    }

    /// Checks the fileset and then every sub-fileset and owned file.
    pub fn validate_fileset(&self, fileset: FileSetId) -> Result<(), Error> {
        let fs = self.fileset(fileset);
        debug!("validating {}", self.describe(fileset));
        if fs.name().is_empty() {
            return Err(Error::MissingName("fileset"));
        }
        if fs.directory.as_os_str().is_empty() {
            return Err(Error::MissingPath(self.describe(fileset)));
        }
        let path = self
            .fileset_resolved_path(fileset)
            .map_err(|_| Error::ValidationPathUnresolved(self.describe(fileset)))?;
        check_directory(&path, || self.describe(fileset))?;
        if self.fileset_design(fileset).is_none() {
            return Err(Error::MissingLink(self.describe(fileset), "design"));
        }
        if self.fileset_project(fileset).is_none() {
            return Err(Error::MissingLink(self.describe(fileset), "project"));
        }
        fs.filesets().try_for_each(|c| self.validate_fileset(c))?;
        fs.own_files().iter().try_for_each(|f| self.validate_file(*f))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::design::DesignBuilder;
    use crate::core::file::FileBuilder;
    use crate::core::filetype::{ContentType, FileKind};
    use crate::core::project::ProjectBuilder;
    use crate::core::setting;
    use std::fs;

    fn paths(m: &Model, files: impl Iterator<Item = FileId>) -> Vec<String> {
        files.map(|f| m.file(f).path().display().to_string()).collect()
    }

    #[test]
    fn files_children_first() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let a = m.create_fileset(FileSetBuilder::new("a").design(d)).unwrap();
        let b = m.create_fileset(FileSetBuilder::new("b").parent(a)).unwrap();
        m.create_file(FileBuilder::new("a1.vhdl").fileset(a)).unwrap();
        m.create_file(FileBuilder::new("b1.vhdl").fileset(b)).unwrap();
        m.create_file(FileBuilder::new("a2.txt").fileset(a)).unwrap();

        let all = m.fileset_files(a, FileTypeFilter::Any, SubFileSets::All).unwrap();
        assert_eq!(paths(&m, all), vec!["b1.vhdl", "a1.vhdl", "a2.txt"]);

        let own = m.fileset_files(a, FileTypeFilter::Any, SubFileSets::Exclude).unwrap();
        assert_eq!(paths(&m, own), vec!["a1.vhdl", "a2.txt"]);

        let only = m.fileset_files(a, FileTypeFilter::Any, SubFileSets::Only("b".into())).unwrap();
        assert_eq!(paths(&m, only), vec!["b1.vhdl"]);

        let vhdl = m
            .fileset_files(a, FileKind::VhdlSource.into(), SubFileSets::All)
            .unwrap();
        assert_eq!(paths(&m, vhdl), vec!["b1.vhdl", "a1.vhdl"]);

        let text = m
            .fileset_files(a, ContentType::HumanReadable.into(), SubFileSets::Exclude)
            .unwrap();
        assert_eq!(paths(&m, text), vec!["a1.vhdl", "a2.txt"]);

        assert_eq!(
            m.fileset_files(a, FileTypeFilter::Any, SubFileSets::Only("zzz".into()))
                .unwrap_err(),
            Error::FileSetNotFound(String::from("zzz"), String::from("fileset \"a\""))
        );
        assert_eq!(m.fileset_len(a), 3);
        assert_eq!(m.fileset_len(b), 1);
    }

    #[test]
    fn add_file_once() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let a = m.create_fileset(FileSetBuilder::new("a").design(d)).unwrap();
        let b = m.create_fileset(FileSetBuilder::new("b").design(d)).unwrap();
        let f = m.create_file(FileBuilder::new("x.v")).unwrap();
        m.fileset_add_file(a, f).unwrap();
        assert_eq!(m.file(f).fileset(), Some(a));
        assert_eq!(m.file(f).design(), Some(d));

        let err = Error::FileAlreadyOwned(PathBuf::from("x.v"), String::from("a"));
        assert_eq!(m.fileset_add_file(a, f), Err(err.clone()));
        assert_eq!(m.fileset_add_file(b, f), Err(err));
        assert_eq!(m.fileset(a).own_files(), &[f]);
        assert_eq!(m.fileset(b).own_files().len(), 0);
    }

    #[test]
    fn nest_either_direction() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let a = m.create_fileset(FileSetBuilder::new("a").design(d)).unwrap();
        let b = m.create_fileset(FileSetBuilder::new("b")).unwrap();
        let c = m.create_fileset(FileSetBuilder::new("c")).unwrap();
        m.fileset_add_fileset(a, b).unwrap();
        m.set_fileset_parent(c, a).unwrap();
        for child in [b, c] {
            assert_eq!(m.fileset(child).parent(), Some(a));
            assert_eq!(m.fileset_design(child), Some(d));
        }
        assert_eq!(m.fileset(a).filesets().collect::<Vec<_>>(), vec![b, c]);

        let b2 = m.create_fileset(FileSetBuilder::new("b")).unwrap();
        assert_eq!(
            m.fileset_add_fileset(a, b2),
            Err(Error::DuplicateFileSet(String::from("fileset \"a\""), String::from("b")))
        );
        assert_eq!(
            m.fileset_add_fileset(a, b),
            Err(Error::FileSetAlreadyAdded(String::from("fileset \"a\""), String::from("b")))
        );
        assert_eq!(
            m.fileset_add_fileset(c, b),
            Err(Error::FileSetAlreadyOwned(String::from("b"), String::from("fileset \"a\"")))
        );
        assert_eq!(m.fileset_add_fileset(b, a), Err(Error::FileSetCycle(String::from("a"))));
        assert_eq!(m.fileset_add_fileset(b, b), Err(Error::FileSetCycle(String::from("b"))));
        // a cycle is reported even when the child already has an owner
        assert_eq!(m.set_fileset_parent(a, c), Err(Error::FileSetCycle(String::from("a"))));
        // registered top-level filesets cannot be nested
        let top = m.design(d).default_fileset();
        assert_eq!(
            m.fileset_add_fileset(a, top),
            Err(Error::FileSetAlreadyOwned(String::from("default"), String::from("design \"d\"")))
        );
    }

    #[test]
    fn nested_design_must_agree() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let e = m.create_design(DesignBuilder::new("e")).unwrap();
        let a = m.create_fileset(FileSetBuilder::new("a").design(d)).unwrap();
        assert_eq!(
            m.create_fileset(FileSetBuilder::new("b").parent(a).design(e)),
            Err(Error::DesignMismatch(String::from("fileset \"b\""), String::from("e"), String::from("d")))
        );
        // the failed call left nothing behind
        assert_eq!(m.fileset(a).filesets().count(), 0);
        let b = m.create_fileset(FileSetBuilder::new("b").parent(a)).unwrap();
        assert_eq!(m.set_fileset_design(b, d), Ok(()));
        assert_eq!(m.fileset(b).design(), Some(d));
        assert_eq!(
            m.set_fileset_design(b, e),
            Err(Error::DesignMismatch(String::from("fileset \"b\""), String::from("d"), String::from("e")))
        );
    }

    #[test]
    fn set_design_registers_top_level() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let a = m.create_fileset(FileSetBuilder::new("a")).unwrap();
        m.set_fileset_design(a, d).unwrap();
        assert_eq!(m.design(d).fileset_by_name("a"), Some(a));
        // assigning the same design again changes nothing
        m.set_fileset_design(a, d).unwrap();
        assert_eq!(m.design(d).len(), 2);
    }

    #[test]
    fn project_only_fileset() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p").root("proj"));
        let fs = m.create_fileset(FileSetBuilder::new("loose").project(p).directory("src")).unwrap();
        assert_eq!(m.fileset_project(fs), Some(p));
        assert_eq!(m.fileset_design(fs), None);
        assert_eq!(m.fileset_resolved_path(fs), Ok(PathBuf::from("proj/src")));
        let q = m.create_project(ProjectBuilder::new("q"));
        assert_eq!(
            m.set_fileset_project(fs, q),
            Err(Error::ProjectMismatch(String::from("fileset \"loose\""), String::from("p"), String::from("q")))
        );
    }

    #[test]
    fn resolved_paths() {
        let mut m = Model::new();
        let p = m.create_project(ProjectBuilder::new("p").root("project"));
        let d = m.create_design(DesignBuilder::new("d").project(p).directory("designA")).unwrap();
        let a = m.create_fileset(FileSetBuilder::new("a").design(d).directory("../lib")).unwrap();
        let b = m.create_fileset(FileSetBuilder::new("b").parent(a).directory("sub")).unwrap();
        assert_eq!(m.fileset_resolved_path(a), Ok(PathBuf::from("project/lib")));
        assert_eq!(m.fileset_resolved_path(b), Ok(PathBuf::from("project/lib/sub")));

        let abs = std::env::temp_dir().join("abs");
        let c = m.create_fileset(FileSetBuilder::new("c").parent(a).directory(&abs)).unwrap();
        assert_eq!(m.fileset_resolved_path(c), Ok(filesystem::normalize(&abs)));

        let loose = m.create_fileset(FileSetBuilder::new("loose")).unwrap();
        assert_eq!(
            m.fileset_resolved_path(loose),
            Err(Error::PathUnresolved(String::from("fileset \"loose\"")))
        );
    }

    #[test]
    fn get_or_create_library() {
        let mut m = Model::new();
        let d = m.create_design(DesignBuilder::new("d")).unwrap();
        let a = m
            .create_fileset(FileSetBuilder::new("a").design(d).vhdl_version(VhdlVersion::Vhdl2008))
            .unwrap();
        let b = m.create_fileset(FileSetBuilder::new("b").design(d)).unwrap();

        let lib = m.get_or_create_vhdl_library(a, "foo").unwrap();
        assert_eq!(m.get_or_create_vhdl_library(a, "foo"), Ok(lib));
        assert_eq!(m.design(d).library_by_name("foo"), Some(lib));
        assert_eq!(m.local_setting::<setting::VhdlVersion>(lib), Some(VhdlVersion::Vhdl2008));
        // another fileset of the design finds the same library
        assert_eq!(m.get_or_create_vhdl_library(b, "foo"), Ok(lib));
        assert_eq!(m.design(d).libraries().count(), 1);

        let loose = m.create_fileset(FileSetBuilder::new("loose")).unwrap();
        assert_eq!(
            m.get_or_create_vhdl_library(loose, "foo"),
            Err(Error::MissingDesign(String::from("fileset \"loose\"")))
        );
    }

    #[test]
    fn validate_requires_design() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.v"), "").unwrap();
        let mut m = Model::new();
        let fs = m.create_fileset(FileSetBuilder::new("rtl").directory(dir.path())).unwrap();
        let f = m.create_file(FileBuilder::new("a.v").fileset(fs)).unwrap();
        assert_eq!(
            m.validate_file(f),
            Err(Error::MissingLink(String::from("file \"a.v\""), "design"))
        );
        assert_eq!(
            m.validate_fileset(fs),
            Err(Error::MissingLink(String::from("fileset \"rtl\""), "design"))
        );
    }
}
