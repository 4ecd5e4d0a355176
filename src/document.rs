//! The document being built: its object store, registered fonts and pages.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use lopdf::{Dictionary as LoDictionary, Object, ObjectId};

use crate::errors::{Error, Result};
use crate::font::{FontId, FontKey, FontProgram, RegisteredFont};
use crate::image::{jpeg_xobject, png_xobject, AddedImage};
use crate::merge::ForeignDocument;
use crate::page::{PageBuilder, PdfPage};
use crate::serialize::{serialize_document, PdfSaveOptions};
use crate::units::{Mm, PageSize, Pt};
use crate::utils::unique_id;

/// Everything of a document that is shared between its pages.
#[derive(Debug)]
pub struct DocumentStore {
    /// Stamped into every handle this store gives out
    id: usize,
    /// Indirect objects (fonts, images, copied objects). Pages, the page
    /// tree and the catalog are only created when saving.
    pub(crate) objects: lopdf::Document,
    fonts: BTreeMap<FontId, RegisteredFont>,
    next_font: usize,
    /// Font resource names taken by merged pages
    reserved_font_names: BTreeSet<String>,
    next_image: usize,
    text_sequence: u64,
    /// Per foreign document: source object id -> id in this document
    copied_objects: HashMap<usize, HashMap<ObjectId, ObjectId>>,
}

impl DocumentStore {
    fn new() -> Self {
        Self {
            id: unique_id(),
            objects: lopdf::Document::with_version("1.7"),
            fonts: BTreeMap::new(),
            next_font: 1,
            reserved_font_names: BTreeSet::new(),
            next_image: 1,
            text_sequence: 0,
            copied_objects: HashMap::new(),
        }
    }

    pub fn register_font(&mut self, program: Rc<dyn FontProgram>) -> FontId {
        let id = FontId {
            document: self.id,
            index: self.next_font,
        };
        let name = self.allocate_font_name(&BTreeSet::new());
        let reference = self
            .objects
            .add_object(Object::Dictionary(program.font_dictionary()));
        log::debug!("registered font {} as /{name}", program.name());
        self.fonts.insert(
            id,
            RegisteredFont {
                id,
                key: FontKey { name },
                program,
                reference,
            },
        );
        id
    }

    pub fn font(&self, id: FontId) -> Result<&RegisteredFont> {
        if id.document != self.id {
            return Err(Error::UnknownFont(id));
        }
        self.fonts.get(&id).ok_or(Error::UnknownFont(id))
    }

    /// Whether the image handle was issued by this store
    pub(crate) fn owns_image(&self, image: &AddedImage) -> bool {
        image.document == self.id && self.objects.objects.contains_key(&image.reference)
    }

    pub fn fonts(&self) -> impl Iterator<Item = &RegisteredFont> {
        self.fonts.values()
    }

    /// Whether a font resource name is in use anywhere in the document
    pub(crate) fn is_font_name_taken(&self, name: &str) -> bool {
        self.reserved_font_names.contains(name) || self.fonts.values().any(|f| f.key.name == name)
    }

    /// Next `F<n>` that is neither taken nor in `avoid`
    pub(crate) fn allocate_font_name(&mut self, avoid: &BTreeSet<String>) -> String {
        loop {
            let name = format!("F{}", self.next_font);
            self.next_font += 1;
            if !self.is_font_name_taken(&name) && !avoid.contains(&name) {
                return name;
            }
        }
    }

    pub(crate) fn reserve_font_name(&mut self, name: &str) {
        self.reserved_font_names.insert(name.to_string());
    }

    pub(crate) fn next_text_sequence(&mut self) -> u64 {
        self.text_sequence += 1;
        self.text_sequence
    }

    fn add_image(&mut self, stream: lopdf::Stream, width: u32, height: u32) -> AddedImage {
        let reference = self.objects.add_object(stream);
        let id = self.next_image;
        self.next_image += 1;
        AddedImage {
            document: self.id,
            id,
            reference,
            width,
            height,
        }
    }

    pub fn add_jpeg_image(&mut self, bytes: &[u8]) -> Result<AddedImage> {
        let stream = jpeg_xobject(bytes)?;
        let width = stream.dict.get(b"Width")?.as_i64()? as u32;
        let height = stream.dict.get(b"Height")?.as_i64()? as u32;
        Ok(self.add_image(stream, width, height))
    }

    pub fn add_png_image(&mut self, bytes: &[u8]) -> Result<AddedImage> {
        let png = png_xobject(bytes)?;
        let (width, height) = (png.width, png.height);
        let stream = png.into_stream(&mut self.objects);
        Ok(self.add_image(stream, width, height))
    }

    /// Copies `obj` from the foreign document, together with every object
    /// it references. Objects copied from the same document before are
    /// reused.
    pub(crate) fn import_object(&mut self, source: &ForeignDocument, obj: &Object) -> Object {
        let mut pending = Vec::new();
        let copied = self.remap(source.id(), obj, &mut pending);
        self.copy_pending(source, pending);
        copied
    }

    /// [`Self::import_object`] for an indirect object, returning its new id
    pub(crate) fn import_reference(&mut self, source: &ForeignDocument, id: ObjectId) -> ObjectId {
        let mut pending = Vec::new();
        let target = self.map_reference(source.id(), id, &mut pending);
        self.copy_pending(source, pending);
        target
    }

    fn copy_pending(&mut self, source: &ForeignDocument, mut pending: Vec<(ObjectId, ObjectId)>) {
        while let Some((source_id, target_id)) = pending.pop() {
            let copy = match source.document().get_object(source_id) {
                Ok(o) => self.remap(source.id(), o, &mut pending),
                Err(e) => {
                    log::warn!("object {source_id:?} is missing from the source document: {e}");
                    Object::Null
                }
            };
            self.objects.objects.insert(target_id, copy);
        }
    }

    fn remap(
        &mut self,
        source: usize,
        obj: &Object,
        pending: &mut Vec<(ObjectId, ObjectId)>,
    ) -> Object {
        match obj {
            Object::Reference(id) => Object::Reference(self.map_reference(source, *id, pending)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|o| self.remap(source, o, pending))
                    .collect(),
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.remap_dict(source, dict, pending)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.remap_dict(source, &stream.dict, pending);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn remap_dict(
        &mut self,
        source: usize,
        dict: &LoDictionary,
        pending: &mut Vec<(ObjectId, ObjectId)>,
    ) -> LoDictionary {
        let mut out = LoDictionary::new();
        for (key, value) in dict.iter() {
            out.set(key.clone(), self.remap(source, value, pending));
        }
        out
    }

    /// Id an object of the foreign document was copied to, if it was
    pub(crate) fn copied_id(&self, source: &ForeignDocument, id: ObjectId) -> Option<ObjectId> {
        self.copied_objects.get(&source.id())?.get(&id).copied()
    }

    fn map_reference(
        &mut self,
        source: usize,
        id: ObjectId,
        pending: &mut Vec<(ObjectId, ObjectId)>,
    ) -> ObjectId {
        let cache = self.copied_objects.entry(source).or_default();
        if let Some(target) = cache.get(&id) {
            return *target;
        }
        let target = self.objects.new_object_id();
        cache.insert(id, target);
        pending.push((id, target));
        target
    }
}

/// Builds a PDF document page by page.
///
/// ```rust,ignore
/// let mut doc = PdfDocumentBuilder::new();
/// let font = doc.register_font(Rc::new(MetricsFont::monospace("Courier", 1000, 600.0, 800.0, -200.0)));
/// let mut page = doc.add_page_with_size(PageSize::A4);
/// page.add_text("Hello", 12.0, Point::new(72.0, 720.0), font)?;
/// let bytes = doc.save(&PdfSaveOptions::default())?;
/// ```
#[derive(Debug)]
pub struct PdfDocumentBuilder {
    pub(crate) store: DocumentStore,
    pub(crate) pages: Vec<PdfPage>,
}

impl Default for PdfDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocumentBuilder {
    pub fn new() -> Self {
        Self {
            store: DocumentStore::new(),
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, width: Mm, height: Mm) -> PageBuilder<'_> {
        self.add_page_pt(width.into_pt(), height.into_pt())
    }

    pub fn add_page_with_size(&mut self, size: PageSize) -> PageBuilder<'_> {
        let (width, height) = size.dimensions();
        self.add_page_pt(width, height)
    }

    fn add_page_pt(&mut self, width: Pt, height: Pt) -> PageBuilder<'_> {
        self.pages.push(PdfPage::new(width, height));
        let index = self.pages.len() - 1;
        PageBuilder::new(&mut self.pages[index], &mut self.store)
    }

    /// Builder for an existing page, by zero-based index
    pub fn page(&mut self, index: usize) -> Result<PageBuilder<'_>> {
        let len = self.pages.len();
        match self.pages.get_mut(index) {
            Some(page) => Ok(PageBuilder::new(page, &mut self.store)),
            None => Err(Error::index_out_of_range("page", index as i64, len)),
        }
    }

    pub fn pages(&self) -> &[PdfPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn register_font(&mut self, program: Rc<dyn FontProgram>) -> FontId {
        self.store.register_font(program)
    }

    pub fn font(&self, id: FontId) -> Result<&RegisteredFont> {
        self.store.font(id)
    }

    /// Stores a JPEG without placing it on a page
    pub fn add_jpeg_image(&mut self, bytes: &[u8]) -> Result<AddedImage> {
        self.store.add_jpeg_image(bytes)
    }

    /// Stores a PNG without placing it on a page
    pub fn add_png_image(&mut self, bytes: &[u8]) -> Result<AddedImage> {
        self.store.add_png_image(bytes)
    }

    /// Direct access to the object store
    pub fn objects(&self) -> &lopdf::Document {
        &self.store.objects
    }

    pub fn save(&self, opts: &PdfSaveOptions) -> Result<Vec<u8>> {
        serialize_document(self, opts)
    }
}
