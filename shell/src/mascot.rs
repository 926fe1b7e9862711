//! Mascot element over a document node

use oria_core::MascotElement;

use crate::document::Document;

/// Id of the animated mascot on the dashboard
pub const MASCOT_ID: &str = "oria-mascot";

/// Mascot image elements that follow the equipped skin
pub const MASCOT_IDS: [&str; 2] = [MASCOT_ID, "profile-mascot"];

/// [`MascotElement`] backed by one element of a [`Document`]
#[derive(Clone, Debug)]
pub struct DocumentMascot<D> {
    doc: D,
    id: String,
}

impl<D: Document + Clone> DocumentMascot<D> {
    /// Bind to `id`, or `None` when the page has no such element
    pub fn bind(doc: &D, id: &str) -> Option<Self> {
        doc.exists(id).then(|| Self {
            doc: doc.clone(),
            id: id.to_string(),
        })
    }

    /// Bound element id
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<D: Document> MascotElement for DocumentMascot<D> {
    fn set_image(&mut self, src: &str) {
        self.doc.set_attribute(&self.id, "src", src);
    }

    fn add_class(&mut self, class: &str) {
        self.doc.add_class(&self.id, class);
    }

    fn remove_class(&mut self, class: &str) {
        self.doc.remove_class(&self.id, class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HeadlessDocument;

    #[test]
    fn test_bind_requires_element() {
        let doc = HeadlessDocument::new();
        assert!(DocumentMascot::bind(&doc, MASCOT_ID).is_none());

        doc.create(MASCOT_ID);
        let mascot = DocumentMascot::bind(&doc, MASCOT_ID).unwrap();
        assert_eq!(mascot.id(), MASCOT_ID);
    }

    #[test]
    fn test_writes_through_to_document() {
        let doc = HeadlessDocument::oria_page();
        let mut mascot = DocumentMascot::bind(&doc, MASCOT_ID).unwrap();

        mascot.set_image("/static/img/IMG_8472.png");
        mascot.add_class("rocking-animation");

        assert_eq!(
            doc.attribute(MASCOT_ID, "src").as_deref(),
            Some("/static/img/IMG_8472.png")
        );
        assert!(doc.has_class(MASCOT_ID, "rocking-animation"));

        mascot.remove_class("rocking-animation");
        assert!(!doc.has_class(MASCOT_ID, "rocking-animation"));
    }
}
