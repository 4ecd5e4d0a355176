//! Copying the content of pages from other documents onto a page.

use std::collections::{BTreeSet, HashMap};

use lopdf::{Dictionary as LoDictionary, Object, ObjectId};
use serde_derive::{Deserialize, Serialize};

use crate::constants::{RESOURCE_FONT, RESOURCE_XOBJECT};
use crate::deserialize::{expect_reference, page_resources, parse_content, resolve, resolve_dict};
use crate::errors::{Error, Result};
use crate::ops::Op;
use crate::page::PageBuilder;
use crate::raster::XObjectImage;
use crate::utils::unique_id;

/// What to do when both pages define a resource with the same name in a
/// category without a renaming strategy (everything except fonts and XObjects)
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceConflictPolicy {
    /// Fail with [`Error::ResourceCollision`], leaving the page unchanged
    #[default]
    Fail,
    /// Keep the entry already on the page and drop the incoming one
    KeepExisting,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergeOptions {
    pub on_resource_conflict: ResourceConflictPolicy,
}

/// A parsed PDF whose pages can be copied into a [`crate::PdfDocumentBuilder`]
#[derive(Debug)]
pub struct ForeignDocument {
    id: usize,
    document: lopdf::Document,
}

impl ForeignDocument {
    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_document(lopdf::Document::load_mem(bytes)?))
    }

    pub fn from_document(document: lopdf::Document) -> Self {
        Self {
            id: unique_id(),
            document,
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub fn document(&self) -> &lopdf::Document {
        &self.document
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page by one-based page number
    pub fn page(&self, number: u32) -> Result<ForeignPage<'_>> {
        let pages = self.document.get_pages();
        let page_id = *pages
            .get(&number)
            .ok_or_else(|| Error::index_out_of_range("page", number as i64, pages.len()))?;

        let content = self.document.get_page_content(page_id)?;
        let operations = parse_content(&content)?;
        let resources = page_resources(page_id, &self.document)?;
        Ok(ForeignPage {
            source: self,
            operations,
            resources,
        })
    }
}

/// Operations and resources of one page of a [`ForeignDocument`]
#[derive(Debug, Clone)]
pub struct ForeignPage<'a> {
    source: &'a ForeignDocument,
    operations: Vec<Op>,
    resources: Option<LoDictionary>,
}

impl<'a> ForeignPage<'a> {
    /// Page assembled from parts, the resources referring to objects of `source`
    pub fn new(source: &'a ForeignDocument, operations: Vec<Op>, resources: Option<LoDictionary>) -> Self {
        Self {
            source,
            operations,
            resources,
        }
    }

    pub fn operations(&self) -> &[Op] {
        &self.operations
    }

    pub fn resources(&self) -> Option<&LoDictionary> {
        self.resources.as_ref()
    }

    /// Image XObjects of the page, by resource name
    pub fn images(&self) -> Result<Vec<(String, XObjectImage)>> {
        let doc = self.source.document();
        let Some(xobjects) = self
            .resources
            .as_ref()
            .and_then(|r| r.get(RESOURCE_XOBJECT.as_bytes()).ok())
        else {
            return Ok(Vec::new());
        };

        let mut images = Vec::new();
        for (name, value) in resolve_dict(xobjects, doc, "/XObject")?.iter() {
            let Object::Stream(stream) = resolve(value, doc)? else {
                continue;
            };
            if matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image") {
                images.push((
                    String::from_utf8_lossy(name).into_owned(),
                    XObjectImage::from_stream(stream, doc)?,
                ));
            }
        }
        Ok(images)
    }
}

fn entry_name(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// Entries of a font or XObject sub-dictionary, all of which must be
/// indirect references
fn referenced_entries(
    resources: &LoDictionary,
    category: &str,
    doc: &lopdf::Document,
) -> Result<Vec<(String, ObjectId)>> {
    let Ok(sub) = resources.get(category.as_bytes()) else {
        return Ok(Vec::new());
    };
    resolve_dict(sub, doc, category)?
        .iter()
        .map(|(name, value)| {
            let name = entry_name(name);
            let id = expect_reference(value, &format!("/{category} /{name}"))?;
            Ok((name, id))
        })
        .collect()
}

/// How one of the other categories ends up on the page
enum CategoryPlan {
    /// Category not on the page yet
    Insert(Object),
    /// Dictionary entries to add to the existing dictionary
    AddEntries(Vec<(Vec<u8>, Object)>),
    /// Array items (e.g. `/ProcSet` names) to append
    AddItems(Vec<Object>),
}

impl PageBuilder<'_> {
    /// [`Self::copy_from_with`] with the default options
    pub fn copy_from(&mut self, page: &ForeignPage<'_>) -> Result<()> {
        self.copy_from_with(page, &MergeOptions::default())
    }

    /// Appends the operations of the foreign page to this page, in a content
    /// stream of their own, and copies the resources they use.
    ///
    /// Fonts and XObjects whose names clash with names of this page (or of
    /// fonts registered with the document) are renamed and the operations
    /// rewritten accordingly. For other categories, entries are merged by
    /// name as the options say. The page is only changed if the whole copy
    /// succeeds.
    pub fn copy_from_with(&mut self, page: &ForeignPage<'_>, options: &MergeOptions) -> Result<()> {
        let source = page.source;
        let Some(resources) = page.resources() else {
            log::debug!("copying page without resources");
            self.open_stream_for_copy();
            self.page
                .contents
                .current_mut()
                .extend(page.operations().iter().cloned());
            return Ok(());
        };

        // validate everything before touching the page
        let doc = source.document();
        let fonts = referenced_entries(resources, RESOURCE_FONT, doc)?;
        let xobjects = referenced_entries(resources, RESOURCE_XOBJECT, doc)?;
        let others = self.plan_other_categories(source, resources, options)?;

        let incoming_fonts = fonts.iter().map(|(n, _)| n.clone()).collect::<BTreeSet<_>>();
        let mut font_renames = HashMap::new();
        for (name, id) in &fonts {
            let target = if self.store.is_font_name_taken(name) || self.page.resources.has_font(name) {
                let renamed = self.store.allocate_font_name(&incoming_fonts);
                log::debug!("font /{name} renamed to /{renamed}");
                font_renames.insert(name.clone(), renamed.clone());
                renamed
            } else {
                name.clone()
            };
            self.store.reserve_font_name(&target);
            let copied = self.store.import_reference(source, *id);
            self.page.resources.register_font(&target, copied);
        }

        let incoming_xobjects = xobjects.iter().map(|(n, _)| n.clone()).collect::<BTreeSet<_>>();
        let mut xobject_renames = HashMap::new();
        for (name, id) in &xobjects {
            let target = if self.page.resources.is_allocated_image_name(name)
                || self.page.resources.has_xobject(name)
            {
                let renamed = self.page.resources.allocate_xobject_name(&incoming_xobjects);
                log::debug!("XObject /{name} renamed to /{renamed}");
                xobject_renames.insert(name.clone(), renamed.clone());
                renamed
            } else {
                name.clone()
            };
            let copied = self.store.import_reference(source, *id);
            self.page.resources.insert_xobject(&target, copied);
        }

        for (category, plan) in others {
            self.apply_category_plan(source, &category, plan);
        }

        self.open_stream_for_copy();
        let ops = page.operations().iter().map(|op| match op {
            Op::SetFontAndSize { font, size } => match font_renames.get(font) {
                Some(renamed) => Op::SetFontAndSize {
                    font: renamed.clone(),
                    size: *size,
                },
                None => op.clone(),
            },
            Op::InvokeXObject { name } => match xobject_renames.get(name) {
                Some(renamed) => Op::InvokeXObject {
                    name: renamed.clone(),
                },
                None => op.clone(),
            },
            _ => op.clone(),
        });
        self.page.contents.current_mut().extend(ops);
        Ok(())
    }

    /// The copied operations go into a fresh stream unless the current one
    /// is still empty
    fn open_stream_for_copy(&mut self) {
        if !self.page.contents.current().is_empty() {
            self.page.contents.new_stream_after();
        }
    }

    /// Whether an entry on the page is the copy of the incoming entry.
    /// References at any depth are compared through the copy cache.
    fn is_same_entry(&self, source: &ForeignDocument, ours: &Object, theirs: &Object) -> bool {
        match (ours, theirs) {
            (Object::Reference(ours), Object::Reference(theirs)) => {
                self.store.copied_id(source, *theirs) == Some(*ours)
            }
            (Object::Array(ours), Object::Array(theirs)) => {
                ours.len() == theirs.len()
                    && ours
                        .iter()
                        .zip(theirs)
                        .all(|(o, t)| self.is_same_entry(source, o, t))
            }
            (Object::Dictionary(ours), Object::Dictionary(theirs)) => {
                self.is_same_dictionary(source, ours, theirs)
            }
            (Object::Stream(ours), Object::Stream(theirs)) => {
                ours.content == theirs.content
                    && self.is_same_dictionary(source, &ours.dict, &theirs.dict)
            }
            _ => ours == theirs,
        }
    }

    fn is_same_dictionary(
        &self,
        source: &ForeignDocument,
        ours: &LoDictionary,
        theirs: &LoDictionary,
    ) -> bool {
        ours.len() == theirs.len()
            && theirs.iter().all(|(key, t)| {
                ours.get(key)
                    .map_or(false, |o| self.is_same_entry(source, o, t))
            })
    }

    fn plan_other_categories(
        &self,
        source: &ForeignDocument,
        resources: &LoDictionary,
        options: &MergeOptions,
    ) -> Result<Vec<(String, CategoryPlan)>> {
        let doc = source.document();
        let mut plans = Vec::new();
        for (key, value) in resources.iter() {
            let category = entry_name(key);
            if category == RESOURCE_FONT || category == RESOURCE_XOBJECT {
                continue;
            }
            let incoming = resolve(value, doc)?;
            let Some(existing) = self.page.resources.category(&category) else {
                plans.push((category, CategoryPlan::Insert(incoming.clone())));
                continue;
            };

            let collision = |name: String| -> Result<()> {
                match options.on_resource_conflict {
                    ResourceConflictPolicy::Fail => Err(Error::ResourceCollision {
                        category: category.clone(),
                        name,
                    }),
                    ResourceConflictPolicy::KeepExisting => {
                        log::warn!("keeping existing /{category} /{name}, incoming entry dropped");
                        Ok(())
                    }
                }
            };

            match (existing, incoming) {
                (Object::Dictionary(ours), Object::Dictionary(theirs)) => {
                    let mut entries = Vec::new();
                    for (name, entry) in theirs.iter() {
                        match ours.get(name) {
                            Ok(current) if self.is_same_entry(source, current, entry) => {}
                            Ok(_) => collision(entry_name(name))?,
                            Err(_) => entries.push((name.clone(), entry.clone())),
                        }
                    }
                    plans.push((category, CategoryPlan::AddEntries(entries)));
                }
                (Object::Array(ours), Object::Array(theirs)) => {
                    let items = theirs
                        .iter()
                        .filter(|item| !ours.iter().any(|o| self.is_same_entry(source, o, item)))
                        .cloned()
                        .collect();
                    plans.push((category, CategoryPlan::AddItems(items)));
                }
                (ours, theirs) if self.is_same_entry(source, ours, theirs) => {}
                _ => collision("*".to_string())?,
            }
        }
        Ok(plans)
    }

    fn apply_category_plan(&mut self, source: &ForeignDocument, category: &str, plan: CategoryPlan) {
        match plan {
            CategoryPlan::Insert(value) => {
                let copied = self.store.import_object(source, &value);
                self.page.resources.set_category(category, copied);
            }
            CategoryPlan::AddEntries(entries) => {
                let Some(Object::Dictionary(existing)) = self.page.resources.category(category) else {
                    return;
                };
                let mut merged = existing.clone();
                for (name, value) in entries {
                    merged.set(name, self.store.import_object(source, &value));
                }
                self.page.resources.set_category(category, Object::Dictionary(merged));
            }
            CategoryPlan::AddItems(items) => {
                let Some(Object::Array(existing)) = self.page.resources.category(category) else {
                    return;
                };
                let mut merged = existing.clone();
                for item in items {
                    merged.push(self.store.import_object(source, &item));
                }
                self.page.resources.set_category(category, Object::Array(merged));
            }
        }
    }
}
