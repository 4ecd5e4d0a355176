//! The resource dictionary of a page

use std::collections::{BTreeMap, BTreeSet, HashMap};

use lopdf::{Dictionary as LoDictionary, Object, ObjectId};

use crate::constants::{RESOURCE_FONT, RESOURCE_XOBJECT};

/// Prefix of generated image resource names (`/I1`, `/I2`, ...)
const IMAGE_PREFIX: &str = "I";

/// Resources of one page, by category (`/Font`, `/XObject`, `/ExtGState`, ...).
///
/// Fonts and XObjects are kept as name -> reference maps, every other
/// category is stored as the token it was read as. Sub-dictionaries are
/// only written when they are non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResources {
    fonts: BTreeMap<String, Object>,
    xobjects: BTreeMap<String, Object>,
    others: BTreeMap<String, Object>,
    /// Next candidate for `I<n>`, never decremented
    next_image: usize,
    registered_xobjects: HashMap<ObjectId, String>,
}

impl Default for PageResources {
    fn default() -> Self {
        Self {
            fonts: BTreeMap::new(),
            xobjects: BTreeMap::new(),
            others: BTreeMap::new(),
            next_image: 1,
            registered_xobjects: HashMap::new(),
        }
    }
}

impl PageResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the XObject available under a generated `I<n>` name. The same
    /// object registered twice gets the same name.
    pub fn register_xobject(&mut self, reference: ObjectId) -> String {
        if let Some(name) = self.registered_xobjects.get(&reference) {
            return name.clone();
        }
        let name = self.allocate_xobject_name(&BTreeSet::new());
        self.insert_xobject(&name, reference);
        name
    }

    pub fn register_font(&mut self, name: &str, reference: ObjectId) {
        self.fonts.insert(name.to_string(), Object::Reference(reference));
    }

    /// Next free `I<n>` name that is neither on the page nor in `avoid`
    pub(crate) fn allocate_xobject_name(&mut self, avoid: &BTreeSet<String>) -> String {
        loop {
            let name = format!("{IMAGE_PREFIX}{}", self.next_image);
            self.next_image += 1;
            if !self.xobjects.contains_key(&name) && !avoid.contains(&name) {
                return name;
            }
        }
    }

    pub(crate) fn insert_xobject(&mut self, name: &str, reference: ObjectId) {
        self.xobjects
            .insert(name.to_string(), Object::Reference(reference));
        self.registered_xobjects
            .entry(reference)
            .or_insert_with(|| name.to_string());
    }

    /// Whether the name could have been handed out by [`Self::register_xobject`]
    pub(crate) fn is_allocated_image_name(&self, name: &str) -> bool {
        name.strip_prefix(IMAGE_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .map_or(false, |n| n < self.next_image)
    }

    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    pub fn has_xobject(&self, name: &str) -> bool {
        self.xobjects.contains_key(name)
    }

    pub fn font(&self, name: &str) -> Option<&Object> {
        self.fonts.get(name)
    }

    pub fn xobject(&self, name: &str) -> Option<&Object> {
        self.xobjects.get(name)
    }

    pub fn image_counter(&self) -> usize {
        self.next_image
    }

    /// Any category other than `/Font` and `/XObject`
    pub fn category(&self, name: &str) -> Option<&Object> {
        self.others.get(name)
    }

    pub(crate) fn set_category(&mut self, name: &str, value: Object) {
        self.others.insert(name.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty() && self.xobjects.is_empty() && self.others.is_empty()
    }

    pub fn to_dictionary(&self) -> LoDictionary {
        let mut dict = LoDictionary::new();
        for (name, value) in &self.others {
            dict.set(name.as_bytes().to_vec(), value.clone());
        }
        if !self.fonts.is_empty() {
            dict.set(RESOURCE_FONT, Object::Dictionary(to_dict(&self.fonts)));
        }
        if !self.xobjects.is_empty() {
            dict.set(RESOURCE_XOBJECT, Object::Dictionary(to_dict(&self.xobjects)));
        }
        dict
    }
}

fn to_dict(map: &BTreeMap<String, Object>) -> LoDictionary {
    map.iter()
        .map(|(k, v)| (k.as_bytes().to_vec(), v.clone()))
        .collect()
}
