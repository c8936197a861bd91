//! OME-XML rendering of the metadata graph.
//!
//! The writer emits the 2016-06 OME schema with the element order the
//! schema requires: plates (wells, well samples, image references) before
//! images (pixels with channels, then TiffData or MetadataOnly, then
//! planes). Text and attribute escaping is handled by quick-xml.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::XmlError;

use super::{Image, Ome, Pixels, Plate, Well};

const OME_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06 \
                               http://www.openmicroscopy.org/Schemas/OME/2016-06/ome.xsd";

/// Render the graph to an OME-XML document string.
pub fn to_xml(ome: &Ome) -> Result<String, XmlError> {
    let mut buffer = Cursor::new(Vec::new());
    let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(wrap)?;

    let mut root = BytesStart::new("OME");
    root.push_attribute(("xmlns", OME_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    root.push_attribute(("UUID", ome.uuid.as_str()));
    writer.write_event(Event::Start(root)).map_err(wrap)?;

    for plate in &ome.plates {
        write_plate(&mut writer, plate)?;
    }
    for image in &ome.images {
        write_image(&mut writer, image)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("OME")))
        .map_err(wrap)?;

    String::from_utf8(buffer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
}

fn write_plate<W: std::io::Write>(writer: &mut Writer<W>, plate: &Plate) -> Result<(), XmlError> {
    let mut elem = BytesStart::new("Plate");
    elem.push_attribute(("ID", plate.id.as_str()));
    elem.push_attribute(("Name", plate.name.as_str()));
    elem.push_attribute(("Rows", plate.rows.to_string().as_str()));
    elem.push_attribute(("Columns", plate.columns.to_string().as_str()));
    writer.write_event(Event::Start(elem)).map_err(wrap)?;

    for well in &plate.wells {
        write_well(writer, well)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Plate")))
        .map_err(wrap)?;
    Ok(())
}

fn write_well<W: std::io::Write>(writer: &mut Writer<W>, well: &Well) -> Result<(), XmlError> {
    let mut elem = BytesStart::new("Well");
    elem.push_attribute(("ID", well.id.as_str()));
    elem.push_attribute(("Row", well.row.to_string().as_str()));
    elem.push_attribute(("Column", well.column.to_string().as_str()));

    // Empty field slots stay out of the document
    let populated: Vec<_> = well.samples.iter().flatten().collect();
    if populated.is_empty() {
        writer.write_event(Event::Empty(elem)).map_err(wrap)?;
        return Ok(());
    }

    writer.write_event(Event::Start(elem)).map_err(wrap)?;
    for sample in populated {
        let mut elem = BytesStart::new("WellSample");
        elem.push_attribute(("ID", sample.id.as_str()));
        elem.push_attribute(("Index", sample.index.to_string().as_str()));
        writer.write_event(Event::Start(elem)).map_err(wrap)?;

        let mut image_ref = BytesStart::new("ImageRef");
        image_ref.push_attribute(("ID", sample.image_ref.as_str()));
        writer.write_event(Event::Empty(image_ref)).map_err(wrap)?;

        writer
            .write_event(Event::End(BytesEnd::new("WellSample")))
            .map_err(wrap)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("Well")))
        .map_err(wrap)?;
    Ok(())
}

fn write_image<W: std::io::Write>(writer: &mut Writer<W>, image: &Image) -> Result<(), XmlError> {
    let mut elem = BytesStart::new("Image");
    elem.push_attribute(("ID", image.id.as_str()));
    elem.push_attribute(("Name", image.name.as_str()));
    writer.write_event(Event::Start(elem)).map_err(wrap)?;

    write_pixels(writer, &image.pixels)?;

    writer
        .write_event(Event::End(BytesEnd::new("Image")))
        .map_err(wrap)?;
    Ok(())
}

fn write_pixels<W: std::io::Write>(writer: &mut Writer<W>, pixels: &Pixels) -> Result<(), XmlError> {
    let mut elem = BytesStart::new("Pixels");
    elem.push_attribute(("ID", pixels.id.as_str()));
    elem.push_attribute(("DimensionOrder", pixels.dimension_order.as_str()));
    elem.push_attribute(("Type", pixels.pixel_type.as_str()));
    elem.push_attribute(("SizeX", pixels.size_x.to_string().as_str()));
    elem.push_attribute(("SizeY", pixels.size_y.to_string().as_str()));
    elem.push_attribute(("SizeZ", pixels.size_z.to_string().as_str()));
    elem.push_attribute(("SizeC", pixels.size_c.to_string().as_str()));
    elem.push_attribute(("SizeT", pixels.size_t.to_string().as_str()));
    writer.write_event(Event::Start(elem)).map_err(wrap)?;

    for channel in &pixels.channels {
        let mut elem = BytesStart::new("Channel");
        elem.push_attribute(("ID", channel.id.as_str()));
        if let Some(name) = &channel.name {
            elem.push_attribute(("Name", name.as_str()));
        }
        elem.push_attribute((
            "SamplesPerPixel",
            channel.samples_per_pixel.to_string().as_str(),
        ));
        writer.write_event(Event::Empty(elem)).map_err(wrap)?;
    }

    for block in &pixels.tiff_data {
        let mut elem = BytesStart::new("TiffData");
        elem.push_attribute(("FirstC", block.first_c.to_string().as_str()));
        elem.push_attribute(("FirstT", block.first_t.to_string().as_str()));
        elem.push_attribute(("FirstZ", block.first_z.to_string().as_str()));
        elem.push_attribute(("PlaneCount", block.plane_count.to_string().as_str()));
        writer.write_event(Event::Start(elem)).map_err(wrap)?;

        let mut uuid = BytesStart::new("UUID");
        uuid.push_attribute(("FileName", block.file_name.as_str()));
        writer.write_event(Event::Start(uuid)).map_err(wrap)?;
        writer
            .write_event(Event::Text(BytesText::new(&block.uuid)))
            .map_err(wrap)?;
        writer
            .write_event(Event::End(BytesEnd::new("UUID")))
            .map_err(wrap)?;

        writer
            .write_event(Event::End(BytesEnd::new("TiffData")))
            .map_err(wrap)?;
    }

    if pixels.metadata_only {
        writer
            .write_event(Event::Empty(BytesStart::new("MetadataOnly")))
            .map_err(wrap)?;
    }

    for plane in &pixels.planes {
        let mut elem = BytesStart::new("Plane");
        elem.push_attribute(("TheC", plane.the_c.to_string().as_str()));
        elem.push_attribute(("TheZ", plane.the_z.to_string().as_str()));
        elem.push_attribute(("TheT", plane.the_t.to_string().as_str()));
        writer.write_event(Event::Empty(elem)).map_err(wrap)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Pixels")))
        .map_err(wrap)?;
    Ok(())
}

fn wrap<E: std::fmt::Display>(error: E) -> XmlError {
    XmlError::Write(error.to_string())
}

// =============================================================================
// Tests
// =============================================================================
