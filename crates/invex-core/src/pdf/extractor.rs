//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfSource, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        if let Object::Stream(stream) = obj {
            let dict = &stream.dict;

            // Only image XObjects
            let subtype = dict.get(b"Subtype").ok()?;
            if subtype.as_name().ok()? != b"Image" {
                return None;
            }

            let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
            let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

            trace!("Found image object: {}x{}", width, height);

            let data = match stream.decompressed_content() {
                Ok(d) => d,
                Err(_) => stream.content.clone(),
            };

            if let Ok(filter) = dict.get(b"Filter") {
                let filter_name = match filter {
                    Object::Name(name) => Some(name.as_slice()),
                    Object::Array(arr) if !arr.is_empty() => {
                        arr.first().and_then(|o| o.as_name().ok())
                    }
                    _ => None,
                };

                match filter_name {
                    Some(b"DCTDecode") => {
                        trace!("Decoding JPEG image");
                        return image::load_from_memory_with_format(
                            &stream.content,
                            image::ImageFormat::Jpeg,
                        )
                        .ok();
                    }
                    Some(b"JPXDecode") => {
                        trace!("Found JPEG2000 image (not supported)");
                        return None;
                    }
                    Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                        trace!("Found fax/JBIG2 image (not supported)");
                        return None;
                    }
                    _ => {}
                }
            }

            let color_space = dict
                .get(b"ColorSpace")
                .ok()
                .and_then(|o| match o {
                    Object::Name(name) => Some(name.as_slice()),
                    Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                    Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                    _ => None,
                })
                .unwrap_or(b"DeviceRGB");

            let bits = dict
                .get(b"BitsPerComponent")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(8) as u8;

            return self.create_image_from_raw(&data, width, height, color_space, bits);
        }
        None
    }

    fn create_image_from_raw(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        color_space: &[u8],
        bits_per_component: u8,
    ) -> Option<DynamicImage> {
        trace!(
            "Creating image from raw data: {}x{}, colorspace={:?}, bits={}",
            width,
            height,
            String::from_utf8_lossy(color_space),
            bits_per_component
        );

        if bits_per_component != 8 {
            trace!("Unsupported bits per component: {}", bits_per_component);
            return None;
        }

        let expected_rgb = (width * height * 3) as usize;
        let expected_gray = (width * height) as usize;

        if color_space == b"DeviceRGB" || color_space == b"RGB" {
            if data.len() >= expected_rgb {
                let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
                for chunk in data[..expected_rgb].chunks(3) {
                    if chunk.len() == 3 {
                        rgba_data.push(chunk[0]);
                        rgba_data.push(chunk[1]);
                        rgba_data.push(chunk[2]);
                        rgba_data.push(255);
                    }
                }
                return ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data)
                    .map(DynamicImage::ImageRgba8);
            }
        } else if color_space == b"DeviceGray" || color_space == b"G" {
            if data.len() >= expected_gray {
                let mut rgba_data = Vec::with_capacity((width * height * 4) as usize);
                for &gray in data[..expected_gray].iter() {
                    rgba_data.push(gray);
                    rgba_data.push(gray);
                    rgba_data.push(gray);
                    rgba_data.push(255);
                }
                return ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data)
                    .map(DynamicImage::ImageRgba8);
            }
        }

        trace!(
            "Could not decode image: data_len={}, expected_rgb={}, expected_gray={}",
            data.len(),
            expected_rgb,
            expected_gray
        );
        None
    }

    /// Get resources dictionary for a page, handling inheritance.
    fn get_page_resources(&self, doc: &Document, page_id: ObjectId) -> Option<lopdf::Dictionary> {
        let page = doc.get_object(page_id).ok()?;
        if let Object::Dictionary(dict) = page {
            if let Ok(resources) = dict.get(b"Resources") {
                if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                    return Some(res_dict.clone());
                }
            }

            if let Ok(parent_ref) = dict.get(b"Parent") {
                if let Object::Reference(parent_id) = parent_ref {
                    return self.get_inherited_resources(doc, *parent_id);
                }
            }
        }
        None
    }

    fn get_inherited_resources(&self, doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let node = doc.get_object(node_id).ok()?;
        if let Object::Dictionary(dict) = node {
            if let Ok(resources) = dict.get(b"Resources") {
                if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                    return Some(res_dict.clone());
                }
            }

            if let Ok(parent_ref) = dict.get(b"Parent") {
                if let Object::Reference(parent_id) = parent_ref {
                    return self.get_inherited_resources(doc, *parent_id);
                }
            }
        }
        None
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfSource for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Empty-password encryption is common in the wild; try it before
        // giving up on an encrypted document.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(text)
    }

    fn page_images(&self, page: u32, _dpi: u32) -> Result<Vec<DynamicImage>> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = self.get_page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut extractor = PdfExtractor::new();
        let result = extractor.load(b"this is not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }
}
