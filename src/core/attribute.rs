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

//! Extensible, type-keyed metadata attached to entities.
//!
//! An attribute is declared by implementing [Attribute] on a marker type. The
//! marker type itself is the key, so a loose string can never be confused for
//! an attribute. Names are only accepted through an [AttributeRegistry], which
//! knows every declared attribute and the value type it expects.

use crate::error::Error;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;

/// A typed key for the attribute bag.
pub trait Attribute: 'static {
    type Value: Clone + Debug + 'static;

    /// The unique name this attribute is written as in a manifest.
    const KEY: &'static str;
}

struct Slot {
    key: &'static str,
    value: Box<dyn Any>,
}

/// The attributes stored locally on one entity.
#[derive(Default)]
pub struct AttributeBag {
    inner: HashMap<TypeId, Slot>,
}

impl Debug for AttributeBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.inner.values().map(|s| s.key).collect();
        keys.sort();
        f.debug_set().entries(keys).finish()
    }
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<A: Attribute>(&self) -> Option<&A::Value> {
        self.inner
            .get(&TypeId::of::<A>())
            .and_then(|s| s.value.downcast_ref::<A::Value>())
    }

    /// Stores `value` under `A`, returning the previous value.
    pub fn insert<A: Attribute>(&mut self, value: A::Value) -> Option<A::Value> {
        self.inner
            .insert(
                TypeId::of::<A>(),
                Slot {
                    key: A::KEY,
                    value: Box::new(value),
                },
            )
            .and_then(|s| s.value.downcast::<A::Value>().ok())
            .map(|b| *b)
    }

    pub fn remove<A: Attribute>(&mut self) -> Option<A::Value> {
        self.inner
            .remove(&TypeId::of::<A>())
            .and_then(|s| s.value.downcast::<A::Value>().ok())
            .map(|b| *b)
    }

    pub fn contains<A: Attribute>(&self) -> bool {
        self.inner.contains_key(&TypeId::of::<A>())
    }

    pub(crate) fn get_by_id(&self, id: &TypeId) -> Option<&dyn Any> {
        self.inner.get(id).map(|s| s.value.as_ref())
    }

    pub(crate) fn insert_by_id(&mut self, id: TypeId, key: &'static str, value: Box<dyn Any>) {
        self.inner.insert(id, Slot { key, value });
    }

    pub(crate) fn remove_by_id(&mut self, id: &TypeId) -> Option<Box<dyn Any>> {
        self.inner.remove(id).map(|s| s.value)
    }

    /// Lists the keys of the locally stored attributes, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.inner.values().map(|s| s.key).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A value type that can be read out of a manifest.
pub trait AttributeValue: Sized {
    /// The TOML type name reported when a value does not convert.
    const TYPE_NAME: &'static str;

    fn from_toml(value: &toml::Value) -> Option<Self>;
}

impl AttributeValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_toml(value: &toml::Value) -> Option<Self> {
        value.as_str().map(|s| s.to_string())
    }
}

impl AttributeValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_toml(value: &toml::Value) -> Option<Self> {
        value.as_bool()
    }
}

impl AttributeValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_toml(value: &toml::Value) -> Option<Self> {
        value.as_integer()
    }
}

impl AttributeValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_toml(value: &toml::Value) -> Option<Self> {
        match value {
            toml::Value::Float(f) => Some(*f),
            toml::Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl AttributeValue for PathBuf {
    const TYPE_NAME: &'static str = "path";

    fn from_toml(value: &toml::Value) -> Option<Self> {
        value.as_str().map(PathBuf::from)
    }
}

impl AttributeValue for Vec<String> {
    const TYPE_NAME: &'static str = "array of strings";

    fn from_toml(value: &toml::Value) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(|s| s.to_string()))
            .collect()
    }
}

type Converter = fn(&toml::Value) -> Option<Box<dyn Any>>;

#[derive(Clone, Copy)]
pub(crate) struct Declared {
    pub(crate) id: TypeId,
    pub(crate) key: &'static str,
    pub(crate) type_name: &'static str,
    pub(crate) convert: Converter,
}

impl Debug for Declared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Declared")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn convert<A: Attribute>(value: &toml::Value) -> Option<Box<dyn Any>>
where
    A::Value: AttributeValue,
{
    <A::Value as AttributeValue>::from_toml(value).map(|v| Box::new(v) as Box<dyn Any>)
}

/// The set of attributes that may be addressed by name.
#[derive(Debug, Default)]
pub struct AttributeRegistry {
    declared: HashMap<&'static str, Declared>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `A` so it can be looked up by its key.
    pub fn declare<A: Attribute>(mut self) -> Self
    where
        A::Value: AttributeValue,
    {
        self.declared.insert(
            A::KEY,
            Declared {
                id: TypeId::of::<A>(),
                key: A::KEY,
                type_name: <A::Value as AttributeValue>::TYPE_NAME,
                convert: convert::<A>,
            },
        );
        self
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<&Declared, Error> {
        self.declared
            .get(name)
            .ok_or_else(|| Error::NotAnAttribute(name.to_string()))
    }

    /// Converts a raw manifest value into the declared attribute's value type.
    pub(crate) fn convert(&self, name: &str, value: &toml::Value) -> Result<(&Declared, Box<dyn Any>), Error> {
        let declared = self.lookup(name)?;
        match (declared.convert)(value) {
            Some(v) => Ok((declared, v)),
            None => Err(Error::AttributeValueType(name.to_string(), declared.type_name)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Owner;
    impl Attribute for Owner {
        type Value = String;
        const KEY: &'static str = "owner";
    }

    struct Seed;
    impl Attribute for Seed {
        type Value = i64;
        const KEY: &'static str = "seed";
    }

    #[test]
    fn bag_by_type() {
        let mut bag = AttributeBag::new();
        assert_eq!(bag.get::<Owner>(), None);
        assert_eq!(bag.insert::<Owner>(String::from("alice")), None);
        assert_eq!(bag.insert::<Seed>(7), None);
        assert_eq!(bag.get::<Owner>(), Some(&String::from("alice")));
        assert_eq!(bag.insert::<Owner>(String::from("bob")), Some(String::from("alice")));
        assert_eq!(bag.keys(), vec!["owner", "seed"]);
        assert_eq!(bag.remove::<Seed>(), Some(7));
        assert_eq!(bag.remove::<Seed>(), None);
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn registry_lookup() {
        let reg = AttributeRegistry::new().declare::<Owner>().declare::<Seed>();
        assert_eq!(reg.is_declared("owner"), true);
        assert_eq!(reg.lookup("color").unwrap_err(), Error::NotAnAttribute(String::from("color")));

        let (decl, value) = reg.convert("seed", &toml::Value::Integer(3)).unwrap();
        assert_eq!(decl.key, "seed");
        assert_eq!(value.downcast_ref::<i64>(), Some(&3));

        assert_eq!(
            reg.convert("seed", &toml::Value::String(String::from("3"))).unwrap_err(),
            Error::AttributeValueType(String::from("seed"), "integer")
        );
    }

    #[test]
    fn string_arrays() {
        let good = toml::Value::Array(vec![toml::Value::String(String::from("a"))]);
        assert_eq!(Vec::<String>::from_toml(&good), Some(vec![String::from("a")]));
        let bad = toml::Value::Array(vec![toml::Value::Integer(1)]);
        assert_eq!(Vec::<String>::from_toml(&bad), None);
    }
}
