use image::RgbImage;
use log::info;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

// A4 in PDF points.
const A4_WIDTH: f32 = 595.28;
const A4_HEIGHT: f32 = 841.89;

/// Fixed top margin (10 mm).
const TOP_MARGIN: f32 = 28.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Placement of one rasterized transcript across one or more A4 pages.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub orientation: Orientation,
    pub page_width: f32,
    pub page_height: f32,
    /// Scaled image dimensions (uniform min-fit scale, no distortion).
    pub image_width: f32,
    pub image_height: f32,
    /// Horizontal offset centering the image on the page.
    pub offset_x: f32,
    /// Per-page offset of the image top, measured down from the page top.
    /// Page 0 sits at the top margin; each following page shifts the same
    /// image up by one printable height.
    pub offsets_y: Vec<f32>,
}

impl PageLayout {
    pub fn page_count(&self) -> usize {
        self.offsets_y.len()
    }

    pub fn printable_height(&self) -> f32 {
        self.page_height - TOP_MARGIN
    }
}

/// Computes the sliding-window pagination for a rasterized transcript.
///
/// Orientation follows the bitmap's aspect, the scale fits the whole bitmap
/// inside a single page, and pages are appended while the scaled height keeps
/// overflowing the printable window.
pub fn paginate(bitmap_width: u32, bitmap_height: u32) -> PageLayout {
    let bitmap_width = bitmap_width.max(1);
    let bitmap_height = bitmap_height.max(1);

    let orientation = if bitmap_height > bitmap_width {
        Orientation::Portrait
    } else {
        Orientation::Landscape
    };
    let (page_width, page_height) = match orientation {
        Orientation::Portrait => (A4_WIDTH, A4_HEIGHT),
        Orientation::Landscape => (A4_HEIGHT, A4_WIDTH),
    };

    let scale = (page_width / bitmap_width as f32).min(page_height / bitmap_height as f32);
    let image_width = bitmap_width as f32 * scale;
    let image_height = bitmap_height as f32 * scale;

    let printable = page_height - TOP_MARGIN;
    let pages = ((image_height / printable).ceil() as usize).max(1);
    let offsets_y = (0..pages)
        .map(|page| TOP_MARGIN - page as f32 * printable)
        .collect();

    PageLayout {
        orientation,
        page_width,
        page_height,
        image_width,
        image_height,
        offset_x: (page_width - image_width) / 2.0,
        offsets_y,
    }
}

/// Assembles the PDF: the bitmap is embedded once as an image XObject and
/// drawn on every page at the layout's offsets.
pub fn render(layout: &PageLayout, bitmap: &RgbImage) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => bitmap.width() as i64,
            "Height" => bitmap.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        bitmap.as_raw().clone(),
    ));

    let mut kids: Vec<Object> = Vec::with_capacity(layout.page_count());
    for offset_y in &layout.offsets_y {
        // PDF origin is bottom-left; layout offsets are from the page top.
        let bottom = layout.page_height - offset_y - layout.image_height;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        layout.image_width.into(),
                        0.into(),
                        0.into(),
                        layout.image_height.into(),
                        layout.offset_x.into(),
                        bottom.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                layout.page_width.into(),
                layout.page_height.into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Assembly seam for the exporter: turns a captured bitmap into finished
/// document bytes.
pub trait Assembler: Send + Sync {
    fn assemble(&self, bitmap: &RgbImage) -> Result<Vec<u8>, lopdf::Error>;
}

/// Production assembler: sliding-window pagination followed by `render`.
#[derive(Default)]
pub struct PdfAssembler;

impl Assembler for PdfAssembler {
    fn assemble(&self, bitmap: &RgbImage) -> Result<Vec<u8>, lopdf::Error> {
        let layout = paginate(bitmap.width(), bitmap.height());
        info!(
            "Assembling transcript: {} page(s), {:?}",
            layout.page_count(),
            layout.orientation
        );
        render(&layout, bitmap)
    }
}
