//! KML / KMZ placemark sources.
//!
//! Nomenclature catalogs ship as KMZ: a zip archive holding a single KML
//! document of `<Placemark>` elements, each with a `<name>`, a
//! `<Point><coordinates>lon,lat[,alt]</coordinates></Point>` and optional
//! `<ExtendedData>` attributes.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{FeatureDataSource, Placemark};
use crate::error::{GuesserError, Result};

fn unreadable(msg: String) -> GuesserError {
    GuesserError::CatalogUnreadable(msg)
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// A KML document already held in memory.
#[derive(Debug, Clone)]
pub struct KmlDocument {
    text: String,
}

impl KmlDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| unreadable(format!("cannot read {}: {e}", path.display())))?;
        Ok(Self::new(text))
    }
}

impl FeatureDataSource for KmlDocument {
    fn placemarks(&self) -> Result<Vec<Placemark>> {
        parse_placemarks(&self.text)
    }
}

/// A KMZ archive on disk. The first `.kml` entry is parsed.
#[derive(Debug, Clone)]
pub struct KmzArchive {
    path: PathBuf,
}

impl KmzArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_kml(&self) -> Result<String> {
        let shown = self.path.display();
        let file = File::open(&self.path)
            .map_err(|e| unreadable(format!("cannot open {shown}: {e}")))?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| unreadable(format!("{shown} is not a KMZ archive: {e}")))?;

        let Some(entry_name) = archive
            .file_names()
            .find(|n| n.to_ascii_lowercase().ends_with(".kml"))
            .map(str::to_owned)
        else {
            return Err(unreadable(format!("{shown} contains no .kml entry")));
        };

        let mut entry = archive
            .by_name(&entry_name)
            .map_err(|e| unreadable(format!("{shown}: cannot open {entry_name}: {e}")))?;
        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|e| unreadable(format!("{shown}: read failed for {entry_name}: {e}")))?;
        Ok(text)
    }
}

impl FeatureDataSource for KmzArchive {
    fn placemarks(&self) -> Result<Vec<Placemark>> {
        let text = self.read_kml()?;
        parse_placemarks(&text)
    }
}

/// Open a catalog file, picking the KML or KMZ reader from the extension.
pub fn open_catalog(path: &Path) -> Result<Box<dyn FeatureDataSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("kml") => Ok(Box::new(KmlDocument::from_path(path)?)),
        Some("kmz") => Ok(Box::new(KmzArchive::new(path))),
        _ => Err(unreadable(format!(
            "{}: expected a .kml or .kmz file",
            path.display()
        ))),
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

fn name_attribute(e: &BytesStart<'_>) -> Result<Option<String>> {
    let attr = e
        .try_get_attribute("name")
        .map_err(|err| unreadable(format!("bad attribute: {err}")))?;
    match attr {
        Some(a) => {
            let v = a
                .unescape_value()
                .map_err(|err| unreadable(format!("bad attribute value: {err}")))?;
            Ok(Some(v.trim().to_string()))
        }
        None => Ok(None),
    }
}

/// Extract every `<Placemark>` from a KML document, in document order.
///
/// Only XML-level errors fail the parse. Placemarks with missing or odd
/// content are returned as-is and judged by the loader.
pub fn parse_placemarks(kml: &str) -> Result<Vec<Placemark>> {
    let mut reader = Reader::from_str(kml);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut current: Option<Placemark> = None;
    // Element names below (and including) the open Placemark.
    let mut depth_names: Vec<Vec<u8>> = Vec::new();
    let mut data_key: Option<String> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            unreadable(format!(
                "malformed KML near byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if local == b"Placemark" {
                    current = Some(Placemark::default());
                    depth_names.clear();
                    data_key = None;
                } else if current.is_some() && (local == b"Data" || local == b"SimpleData") {
                    data_key = name_attribute(&e)?;
                }
                if current.is_some() {
                    depth_names.push(local);
                }
                text.clear();
            }
            Event::Text(t) => {
                if current.is_some() {
                    let s = t
                        .unescape()
                        .map_err(|e| unreadable(format!("bad text content: {e}")))?;
                    text.push_str(&s);
                }
            }
            Event::CData(c) => {
                if current.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                let local = local.as_ref();
                if local == b"Placemark" {
                    if let Some(pm) = current.take() {
                        out.push(pm);
                    }
                    depth_names.clear();
                } else if let Some(pm) = current.as_mut() {
                    let value = text.trim();
                    match local {
                        // Only the Placemark's own name, not nested Style/Folder names.
                        b"name" if depth_names.len() == 2 => {
                            pm.name = Some(value.to_string());
                        }
                        b"coordinates" if pm.coordinates.is_none() => {
                            pm.coordinates = Some(value.to_string());
                        }
                        b"value" => {
                            if let Some(key) = &data_key {
                                pm.properties.push((key.clone(), value.to_string()));
                            }
                        }
                        b"SimpleData" => {
                            if let Some(key) = data_key.take() {
                                pm.properties.push((key, value.to_string()));
                            }
                        }
                        b"Data" => data_key = None,
                        _ => {}
                    }
                    depth_names.pop();
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>MARS nomenclature</name>
    <Placemark>
      <name>Gale</name>
      <ExtendedData>
        <Data name="diameter"><value>154.73</value></Data>
        <Data name="type"><value>Crater, craters</value></Data>
      </ExtendedData>
      <Point><coordinates>137.81,-5.37,0</coordinates></Point>
    </Placemark>
    <Placemark>
      <name><![CDATA[Olympus Mons]]></name>
      <ExtendedData>
        <SchemaData schemaUrl="#s">
          <SimpleData name="diameter_km">648</SimpleData>
        </SchemaData>
      </ExtendedData>
      <Point><coordinates> -133.8,18.65 </coordinates></Point>
    </Placemark>
    <Placemark>
      <Point><coordinates>10,10</coordinates></Point>
    </Placemark>
  </Document>
</kml>"##;

    #[test]
    fn parses_names_coordinates_and_extended_data() {
        let pms = parse_placemarks(SAMPLE).unwrap();
        assert_eq!(pms.len(), 3);

        assert_eq!(pms[0].name.as_deref(), Some("Gale"));
        assert_eq!(pms[0].coordinates.as_deref(), Some("137.81,-5.37,0"));
        assert_eq!(
            pms[0].properties,
            vec![
                ("diameter".to_string(), "154.73".to_string()),
                ("type".to_string(), "Crater, craters".to_string()),
            ]
        );

        assert_eq!(pms[1].name.as_deref(), Some("Olympus Mons"));
        assert_eq!(pms[1].coordinates.as_deref(), Some("-133.8,18.65"));
        assert_eq!(pms[1].properties, vec![("diameter_km".to_string(), "648".to_string())]);

        assert_eq!(pms[2].name, None, "document name must not leak into placemarks");
    }

    #[test]
    fn malformed_xml_is_unreadable() {
        let err = parse_placemarks("<kml><Placemark><name>x</Placemark></kml>").unwrap_err();
        assert!(matches!(err, GuesserError::CatalogUnreadable(_)), "got {err:?}");
    }

    #[test]
    fn kmz_archive_reads_embedded_kml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MARS_nomenclature_center_pts.kmz");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let opts = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("doc.kml", opts).unwrap();
            zip.write_all(SAMPLE.as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        let pms = KmzArchive::new(&path).placemarks().unwrap();
        assert_eq!(pms.len(), 3);
        assert_eq!(pms[0].name.as_deref(), Some("Gale"));
    }

    #[test]
    fn kmz_without_kml_entry_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MOON_nomenclature_center_pts.kmz");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let opts = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("readme.txt", opts).unwrap();
            zip.write_all(b"no placemarks here").unwrap();
            zip.finish().unwrap();
        }

        let err = KmzArchive::new(&path).placemarks().unwrap_err();
        match err {
            GuesserError::CatalogUnreadable(msg) => {
                assert!(msg.contains("no .kml entry"), "unexpected message: {msg}")
            }
            other => panic!("expected CatalogUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn missing_kmz_is_unreadable() {
        let err = KmzArchive::new("/nonexistent/catalog.kmz").placemarks().unwrap_err();
        assert!(matches!(err, GuesserError::CatalogUnreadable(_)));
    }

    #[test]
    fn open_catalog_rejects_unknown_extension() {
        assert!(open_catalog(Path::new("features.csv")).is_err());
    }
}
