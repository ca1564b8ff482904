//! Picture shapes and image format detection.

use image::ImageFormat;
use serde::Serialize;

use super::units::Geometry;
use super::xml::Element;

/// Image formats PowerPoint renders natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PictureFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl PictureFormat {
    /// Detect the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Png => Some(PictureFormat::Png),
            ImageFormat::Jpeg => Some(PictureFormat::Jpeg),
            ImageFormat::Gif => Some(PictureFormat::Gif),
            ImageFormat::Bmp => Some(PictureFormat::Bmp),
            ImageFormat::Tiff => Some(PictureFormat::Tiff),
            _ => None,
        }
    }

    /// File extension used for the media part.
    pub fn extension(self) -> &'static str {
        match self {
            PictureFormat::Png => "png",
            PictureFormat::Jpeg => "jpeg",
            PictureFormat::Gif => "gif",
            PictureFormat::Bmp => "bmp",
            PictureFormat::Tiff => "tiff",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            PictureFormat::Png => "image/png",
            PictureFormat::Jpeg => "image/jpeg",
            PictureFormat::Gif => "image/gif",
            PictureFormat::Bmp => "image/bmp",
            PictureFormat::Tiff => "image/tiff",
        }
    }
}

/// Build a `p:pic` whose blip (relationship `rel_id`) is stretched over
/// exactly `geometry`.
pub(crate) fn picture_element(id: u32, name: &str, rel_id: &str, geometry: Geometry) -> Element {
    let nv = Element::new("p:nvPicPr")
        .with_child(
            Element::new("p:cNvPr")
                .with_attr("id", id.to_string())
                .with_attr("name", name)
                .with_attr("descr", ""),
        )
        .with_child(
            Element::new("p:cNvPicPr")
                .with_child(Element::new("a:picLocks").with_attr("noChangeAspect", "1")),
        )
        .with_child(Element::new("p:nvPr"));

    let blip_fill = Element::new("p:blipFill")
        .with_child(Element::new("a:blip").with_attr("r:embed", rel_id))
        .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect")));

    let sp_pr = Element::new("p:spPr")
        .with_child(
            Element::new("a:xfrm")
                .with_child(
                    Element::new("a:off")
                        .with_attr("x", geometry.left.to_string())
                        .with_attr("y", geometry.top.to_string()),
                )
                .with_child(
                    Element::new("a:ext")
                        .with_attr("cx", geometry.width.to_string())
                        .with_attr("cy", geometry.height.to_string()),
                ),
        )
        .with_child(
            Element::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(Element::new("a:avLst")),
        );

    Element::new("p:pic")
        .with_child(nv)
        .with_child(blip_fill)
        .with_child(sp_pr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::Shape;

    #[test]
    fn sniffs_common_formats() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(PictureFormat::sniff(&png), Some(PictureFormat::Png));
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];
        assert_eq!(PictureFormat::sniff(&jpeg), Some(PictureFormat::Jpeg));
        assert_eq!(PictureFormat::sniff(b"GIF89a...."), Some(PictureFormat::Gif));
        assert_eq!(PictureFormat::sniff(b"not an image at all"), None);
    }

    #[test]
    fn picture_element_carries_geometry_and_relationship() {
        let geometry = Geometry::new(10, 20, 30, 40);
        let el = picture_element(9, "Picture 9", "rId4", geometry);
        assert_eq!(
            el.descend(&["blipFill", "blip"]).unwrap().attr("r:embed"),
            Some("rId4")
        );
        let shape = Shape::from_element(el);
        assert_eq!(shape.name(), "Picture 9");
        assert_eq!(shape.id(), Some(9));
        assert_eq!(shape.geometry(), geometry);
        assert!(!shape.has_text_frame());
    }
}
