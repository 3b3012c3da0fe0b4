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

//! The arena that owns every entity of a project model.
//!
//! Entities never hold references to each other; they hold handles
//! ([ProjectId], [DesignId], [FileSetId], [FileId], [LibraryId]) into the
//! [Model] that created them. A handle is only meaningful for the model that
//! returned it.

use super::attribute::{Attribute, AttributeBag, AttributeRegistry};
use super::design::Design;
use super::file::File;
use super::fileset::FileSet;
use super::library::VhdlLibrary;
use super::project::Project;
use super::setting::{Scope, Setting, Settings};
use crate::error::Error;
use std::any::Any;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DesignId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileSetId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId(pub(crate) usize);

/// A handle to any entity of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Project(ProjectId),
    Design(DesignId),
    FileSet(FileSetId),
    File(FileId),
    Library(LibraryId),
}

impl From<ProjectId> for EntityRef {
    fn from(value: ProjectId) -> Self {
        Self::Project(value)
    }
}

impl From<DesignId> for EntityRef {
    fn from(value: DesignId) -> Self {
        Self::Design(value)
    }
}

impl From<FileSetId> for EntityRef {
    fn from(value: FileSetId) -> Self {
        Self::FileSet(value)
    }
}

impl From<FileId> for EntityRef {
    fn from(value: FileId) -> Self {
        Self::File(value)
    }
}

impl From<LibraryId> for EntityRef {
    fn from(value: LibraryId) -> Self {
        Self::Library(value)
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub(crate) projects: Vec<Project>,
    pub(crate) designs: Vec<Design>,
    pub(crate) filesets: Vec<FileSet>,
    pub(crate) files: Vec<File>,
    pub(crate) libraries: Vec<VhdlLibrary>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }

    pub fn design(&self, id: DesignId) -> &Design {
        &self.designs[id.0]
    }

    pub fn fileset(&self, id: FileSetId) -> &FileSet {
        &self.filesets[id.0]
    }

    pub fn file(&self, id: FileId) -> &File {
        &self.files[id.0]
    }

    pub fn library(&self, id: LibraryId) -> &VhdlLibrary {
        &self.libraries[id.0]
    }

    pub fn project_mut(&mut self, id: ProjectId) -> &mut Project {
        &mut self.projects[id.0]
    }

    pub fn design_mut(&mut self, id: DesignId) -> &mut Design {
        &mut self.designs[id.0]
    }

    pub fn fileset_mut(&mut self, id: FileSetId) -> &mut FileSet {
        &mut self.filesets[id.0]
    }

    pub fn file_mut(&mut self, id: FileId) -> &mut File {
        &mut self.files[id.0]
    }

    /// Iterates over every project created in this model.
    pub fn projects(&self) -> impl Iterator<Item = ProjectId> + '_ {
        (0..self.projects.len()).map(ProjectId)
    }

    /// Names an entity by its kind and its name (or path, for files).
    pub fn describe(&self, entity: impl Into<EntityRef>) -> String {
        match entity.into() {
            EntityRef::Project(id) => format!("project {:?}", self.project(id).name()),
            EntityRef::Design(id) => format!("design {:?}", self.design(id).name()),
            EntityRef::FileSet(id) => format!("fileset {:?}", self.fileset(id).name()),
            EntityRef::File(id) => format!("file {:?}", self.file(id).path()),
            EntityRef::Library(id) => format!("VHDL library {:?}", self.library(id).name()),
        }
    }

    pub(crate) fn scope(&self, entity: EntityRef) -> Scope {
        match entity {
            EntityRef::Project(_) => Scope::Project,
            EntityRef::Design(_) => Scope::Design,
            EntityRef::FileSet(_) => Scope::FileSet,
            EntityRef::Library(_) => Scope::Library,
            EntityRef::File(id) => Scope::File(self.file(id).kind()),
        }
    }

    fn settings(&self, entity: EntityRef) -> &Settings {
        match entity {
            EntityRef::Project(id) => &self.project(id).settings,
            EntityRef::Design(id) => &self.design(id).settings,
            EntityRef::FileSet(id) => &self.fileset(id).settings,
            EntityRef::File(id) => &self.file(id).settings,
            EntityRef::Library(id) => &self.library(id).settings,
        }
    }

    fn settings_mut(&mut self, entity: EntityRef) -> &mut Settings {
        match entity {
            EntityRef::Project(id) => &mut self.projects[id.0].settings,
            EntityRef::Design(id) => &mut self.designs[id.0].settings,
            EntityRef::FileSet(id) => &mut self.filesets[id.0].settings,
            EntityRef::File(id) => &mut self.files[id.0].settings,
            EntityRef::Library(id) => &mut self.libraries[id.0].settings,
        }
    }

    /// The next entity in the resolution chain of cascading settings.
    ///
    /// A fileset defers to its parent fileset before its design, and a
    /// library defers to its design.
    fn setting_parent(&self, entity: EntityRef) -> Option<EntityRef> {
        match entity {
            EntityRef::File(id) => self.file(id).fileset.map(EntityRef::FileSet),
            EntityRef::FileSet(id) => {
                let fs = self.fileset(id);
                match fs.parent {
                    Some(p) => Some(EntityRef::FileSet(p)),
                    None => fs.design.map(EntityRef::Design),
                }
            }
            EntityRef::Design(id) => self.design(id).project.map(EntityRef::Project),
            EntityRef::Library(id) => self.library(id).design.map(EntityRef::Design),
            EntityRef::Project(_) => None,
        }
    }

    /// Returns the value of setting `S` stored directly on `entity`.
    pub fn local_setting<S: Setting>(&self, entity: impl Into<EntityRef>) -> Option<S::Value> {
        *S::slot(self.settings(entity.into()))
    }

    /// Resolves setting `S` for `entity`, walking up the resolution chain until
    /// some entity has a local value.
    pub fn setting<S: Setting>(&self, entity: impl Into<EntityRef>) -> Result<S::Value, Error> {
        let entity = entity.into();
        if S::applies_to(self.scope(entity)) == false {
            return Err(Error::SettingNotApplicable(S::NAME, self.describe(entity)));
        }
        let mut current = Some(entity);
        while let Some(e) = current {
            if let Some(v) = S::slot(self.settings(e)) {
                trace!("resolved {} of {} at {}", S::NAME, self.describe(entity), self.describe(e));
                return Ok(*v);
            }
            current = self.setting_parent(e);
        }
        Err(Error::SettingUnresolved(S::NAME, self.describe(entity)))
    }

    /// Stores (or clears, with `None`) the local value of setting `S` on
    /// `entity`, returning the previous local value.
    ///
    /// Assigning a VHDL library to a file also moves the file's membership
    /// from the previous library to the new one.
    pub fn set_setting<S: Setting>(
        &mut self,
        entity: impl Into<EntityRef>,
        value: Option<S::Value>,
    ) -> Result<Option<S::Value>, Error> {
        let entity = entity.into();
        if S::applies_to(self.scope(entity)) == false {
            return Err(Error::SettingNotApplicable(S::NAME, self.describe(entity)));
        }
        let before = self.settings(entity).vhdl_library();
        let prev = std::mem::replace(S::slot_mut(self.settings_mut(entity)), value);
        let after = self.settings(entity).vhdl_library();
        if before != after {
            let (design, project) = self.entity_links(entity);
            if let Err(e) = self.check_library_link(entity, design, project) {
                *S::slot_mut(self.settings_mut(entity)) = prev;
                return Err(e);
            }
        }
        if let EntityRef::File(id) = entity {
            if before != after {
                if let Some(old) = before {
                    self.libraries[old.0].files.retain(|f| f != &id);
                }
                if let Some(new) = after {
                    self.libraries[new.0].files.push(id);
                }
            }
        }
        debug!("set {} of {} to {:?}", S::NAME, self.describe(entity), value);
        Ok(prev)
    }

    pub(crate) fn design_mismatch(&self, entity: EntityRef, have: DesignId, want: DesignId) -> Error {
        Error::DesignMismatch(
            self.describe(entity),
            self.design(have).name().to_string(),
            self.design(want).name().to_string(),
        )
    }

    pub(crate) fn project_mismatch(&self, entity: EntityRef, have: ProjectId, want: ProjectId) -> Error {
        Error::ProjectMismatch(
            self.describe(entity),
            self.project(have).name().to_string(),
            self.project(want).name().to_string(),
        )
    }

    /// The design and project `entity` belongs to, as far as they are known.
    pub(crate) fn entity_links(&self, entity: EntityRef) -> (Option<DesignId>, Option<ProjectId>) {
        match entity {
            EntityRef::File(id) => {
                let f = self.file(id);
                (
                    f.design.or_else(|| f.fileset.and_then(|fs| self.fileset_design(fs))),
                    f.project.or_else(|| f.fileset.and_then(|fs| self.fileset_project(fs))),
                )
            }
            EntityRef::FileSet(id) => (self.fileset_design(id), self.fileset_project(id)),
            EntityRef::Design(id) => (Some(id), self.design(id).project),
            EntityRef::Library(id) => (self.library(id).design, self.library(id).project),
            EntityRef::Project(id) => (None, Some(id)),
        }
    }

    /// Checks the VHDL library stored on `entity` against the design and
    /// project the entity has (or is about to have).
    pub(crate) fn check_library_link(
        &self,
        entity: EntityRef,
        design: Option<DesignId>,
        project: Option<ProjectId>,
    ) -> Result<(), Error> {
        let lib = match self.settings(entity).vhdl_library() {
            Some(lib) => self.library(lib),
            None => return Ok(()),
        };
        if let (Some(have), Some(want)) = (design, lib.design) {
            if have != want {
                return Err(self.design_mismatch(entity, have, want));
            }
        }
        let lib_project = lib
            .project
            .or_else(|| lib.design.and_then(|d| self.design(d).project));
        if let (Some(have), Some(want)) = (project, lib_project) {
            if have != want {
                return Err(self.project_mismatch(entity, have, want));
            }
        }
        Ok(())
    }

    pub fn attributes(&self, entity: impl Into<EntityRef>) -> &AttributeBag {
        match entity.into() {
            EntityRef::Project(id) => &self.project(id).attributes,
            EntityRef::Design(id) => &self.design(id).attributes,
            EntityRef::FileSet(id) => &self.fileset(id).attributes,
            EntityRef::File(id) => &self.file(id).attributes,
            EntityRef::Library(id) => &self.library(id).attributes,
        }
    }

    fn attributes_mut(&mut self, entity: EntityRef) -> &mut AttributeBag {
        match entity {
            EntityRef::Project(id) => &mut self.projects[id.0].attributes,
            EntityRef::Design(id) => &mut self.designs[id.0].attributes,
            EntityRef::FileSet(id) => &mut self.filesets[id.0].attributes,
            EntityRef::File(id) => &mut self.files[id.0].attributes,
            EntityRef::Library(id) => &mut self.libraries[id.0].attributes,
        }
    }

    /// The next entity in the resolution chain of attributes:
    /// `File -> FileSet -> Design -> Project`.
    fn attribute_parent(&self, entity: EntityRef) -> Option<EntityRef> {
        match entity {
            EntityRef::File(id) => self.file(id).fileset.map(EntityRef::FileSet),
            EntityRef::FileSet(id) => self.fileset_design(id).map(EntityRef::Design),
            EntityRef::Library(id) => self.library(id).design.map(EntityRef::Design),
            EntityRef::Design(id) => self.design(id).project.map(EntityRef::Project),
            EntityRef::Project(_) => None,
        }
    }

    /// Returns the attribute `A` of `entity`, falling back to its ancestors
    /// when it is not set locally.
    pub fn attribute<A: Attribute>(&self, entity: impl Into<EntityRef>) -> Result<&A::Value, Error> {
        let entity = entity.into();
        let mut current = Some(entity);
        while let Some(e) = current {
            if let Some(v) = self.attributes(e).get::<A>() {
                return Ok(v);
            }
            current = self.attribute_parent(e);
        }
        Err(Error::AttributeUnresolved(A::KEY, self.describe(entity)))
    }

    /// Stores the attribute `A` on `entity` only, returning the previous local value.
    pub fn set_attribute<A: Attribute>(&mut self, entity: impl Into<EntityRef>, value: A::Value) -> Option<A::Value> {
        self.attributes_mut(entity.into()).insert::<A>(value)
    }

    /// Deletes the local attribute `A` of `entity`.
    pub fn remove_attribute<A: Attribute>(&mut self, entity: impl Into<EntityRef>) -> Result<A::Value, Error> {
        let entity = entity.into();
        match self.attributes_mut(entity).remove::<A>() {
            Some(v) => Ok(v),
            None => Err(Error::AttributeNotSet(A::KEY, self.describe(entity))),
        }
    }

    /// Stores a declared attribute given by name, checking the value's type.
    pub fn set_attribute_by_name(
        &mut self,
        registry: &AttributeRegistry,
        entity: impl Into<EntityRef>,
        name: &str,
        value: &toml::Value,
    ) -> Result<(), Error> {
        let (declared, value) = registry.convert(name, value)?;
        self.attributes_mut(entity.into())
            .insert_by_id(declared.id, declared.key, value);
        Ok(())
    }

    /// Resolves a declared attribute given by name.
    pub fn attribute_by_name(
        &self,
        registry: &AttributeRegistry,
        entity: impl Into<EntityRef>,
        name: &str,
    ) -> Result<&dyn Any, Error> {
        let declared = registry.lookup(name)?;
        let entity = entity.into();
        let mut current = Some(entity);
        while let Some(e) = current {
            if let Some(v) = self.attributes(e).get_by_id(&declared.id) {
                return Ok(v);
            }
            current = self.attribute_parent(e);
        }
        Err(Error::AttributeUnresolved(declared.key, self.describe(entity)))
    }

    /// Deletes a declared attribute given by name from `entity`.
    pub fn remove_attribute_by_name(
        &mut self,
        registry: &AttributeRegistry,
        entity: impl Into<EntityRef>,
        name: &str,
    ) -> Result<(), Error> {
        let declared = *registry.lookup(name)?;
        let entity = entity.into();
        match self.attributes_mut(entity).remove_by_id(&declared.id) {
            Some(_) => Ok(()),
            None => Err(Error::AttributeNotSet(declared.key, self.describe(entity))),
        }
    }
}
