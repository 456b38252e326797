use std::collections::BTreeMap;

use crate::{Dictionary, Object, ObjectId};

/// An in-memory PDF document: an ordered collection of indirect objects plus
/// the trailer dictionary. Object numbers are handed out sequentially, so
/// iterating the object map visits objects in emission order.
pub struct Document {
    /// The version of the PDF specification to which the file conforms.
    pub version: String,

    /// The trailer gives the location of the cross-reference table and of
    /// certain special objects.
    pub trailer: Dictionary,

    /// The objects that make up the document.
    pub objects: BTreeMap<ObjectId, Object>,

    /// Maximum object id handed out so far.
    pub max_id: u32,
}

impl Document {
    pub fn new() -> Document {
        Document::with_version("1.3")
    }

    /// Create a new document with the given PDF version, e.g. `"1.4"`.
    pub fn with_version<S: Into<String>>(version: S) -> Document {
        Document {
            version: version.into(),
            trailer: Dictionary::new(),
            objects: BTreeMap::new(),
            max_id: 0,
        }
    }

    /// Allocate the next object id without storing an object for it yet.
    /// The caller must eventually fill the slot with [`Document::set_object`].
    pub fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    /// Add an object to the document, assigning it the next object id.
    pub fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        let id = self.new_object_id();
        self.objects.insert(id, object.into());
        id
    }

    /// Store an object under a previously allocated id.
    pub fn set_object<T: Into<Object>>(&mut self, id: ObjectId, object: T) {
        self.objects.insert(id, object.into());
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}
